//! Reefwatch client library.
//!
//! [`ReefClient`] talks to the prediction service over HTTP. [`ChatSession`]
//! drives one streamed assistant exchange at a time on top of it, decoding
//! the event stream into a [`reef::Transcript`] and reporting UI-visible
//! changes to a [`SessionObserver`].

pub use error::{ClientError, SessionError};
pub use http::ReefClient;
pub use reqwest::{self, Client};
pub use session::{
    ActionLabel, CANCELLED_NOTICE, Canceller, ChatSession, Outcome, SessionObserver, SessionState,
};

mod error;
mod http;
mod session;
