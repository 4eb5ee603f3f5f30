//! Events carried by the chat event stream.
//!
//! Each `data: ` line of a `/chat` or `/init-chat` response holds one JSON
//! object, either `{"content": "..."}` or `{"error": "..."}`. The stream
//! has no terminator event; it ends when the body ends.

use serde::{Deserialize, Serialize};

/// Prefix of payload-carrying lines.
pub const DATA_PREFIX: &str = "data: ";

/// Raw JSON payload of a `data: ` line.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventPayload {
    /// Incremental reply text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Error reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EventPayload {
    /// Convert the payload into an event.
    ///
    /// `error` takes precedence over `content`. Payloads with neither key,
    /// or with empty text, produce nothing.
    pub fn into_event(self) -> Option<StreamEvent> {
        match (self.error, self.content) {
            (Some(error), _) if !error.is_empty() => Some(StreamEvent::Error(error)),
            (_, Some(content)) if !content.is_empty() => Some(StreamEvent::Content(content)),
            _ => None,
        }
    }
}

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment to append to the reply.
    Content(String),
    /// A terminal error; the reply is replaced by `Error: <message>`.
    Error(String),
}

impl StreamEvent {
    /// Parse one line of the event stream.
    ///
    /// Returns `Ok(None)` for lines that carry no payload (comments,
    /// keep-alives, blank lines, empty payloads) and `Err` for `data: `
    /// lines whose payload is not valid JSON.
    pub fn parse_line(line: &str) -> Result<Option<Self>, serde_json::Error> {
        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            return Ok(None);
        };
        let payload: EventPayload = serde_json::from_str(data)?;
        Ok(payload.into_event())
    }

    /// Encode the event as a `data: ` line, newline-terminated.
    pub fn to_line(&self) -> String {
        let payload = match self {
            Self::Content(content) => EventPayload {
                content: Some(content.clone()),
                error: None,
            },
            Self::Error(error) => EventPayload {
                content: None,
                error: Some(error.clone()),
            },
        };
        let json = serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_owned());
        format!("{DATA_PREFIX}{json}\n\n")
    }
}
