//! Client and session errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors talking to the prediction service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL or an endpoint path is invalid.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },
    /// The response body is not the expected JSON.
    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors ending a chat exchange.
///
/// Cancellation is not an error; see [`crate::Outcome::Cancelled`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The stream could not be opened or broke while reading.
    #[error("connection failed: {0}")]
    Connection(#[from] ClientError),
    /// The service sent an `{"error": ...}` event.
    #[error("assistant error: {0}")]
    Remote(String),
    /// Another exchange is already streaming.
    #[error("an exchange is already in progress")]
    Busy,
}
