//! Core types for the Reefwatch client.
//!
//! This crate holds everything that does not touch the network: the chat
//! transcript, the event-stream decoder, the `**bold**` markup renderer,
//! SST form handling and the risk-level tables shared by the CLI and the
//! session controller.

pub use {
    decode::{EventDecoder, Utf8Decoder},
    event::{EventPayload, StreamEvent},
    message::{ChatMessage, MessageId, Role, Transcript},
    reading::{Field, ReadingError, SstReadings, limit_decimals, parse_field},
    risk::{ChatRequest, InitContext, PredictRequest, PredictResponse, RiskError, RiskLevel},
};

pub mod decode;
pub mod event;
pub mod markdown;
pub mod message;
pub mod reading;
pub mod risk;
