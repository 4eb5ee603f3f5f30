//! Chat transcript entries.

use crate::markdown;
use serde::{Deserialize, Serialize};

/// Position of a message in its transcript.
pub type MessageId = usize;

/// The author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
pub enum Role {
    /// The user role
    #[serde(rename = "user")]
    #[default]
    User,
    /// The assistant role
    #[serde(rename = "assistant")]
    Assistant,
    /// Informational notices emitted by the client itself, e.g. when a
    /// reply was cancelled or the connection failed.
    #[serde(rename = "notice")]
    Notice,
}

impl Role {
    /// CSS class of chat entries with this role.
    pub fn css_class(&self) -> &'static str {
        match self {
            Role::User => "user-message",
            Role::Assistant | Role::Notice => "ai-message",
        }
    }
}

/// A message in the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatMessage {
    /// Creation order within the transcript
    pub id: MessageId,

    /// The role of the message
    pub role: Role,

    /// The raw text of the message
    pub content: String,

    /// Shown verbatim, without markup, e.g. an error reply
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub plain: bool,
}

impl ChatMessage {
    /// The content rendered as HTML markup, or only escaped if plain.
    pub fn rendered(&self) -> String {
        if self.plain {
            markdown::escape(&self.content)
        } else {
            markdown::to_html(&self.content)
        }
    }
}

/// Append-only, ordered list of chat messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its id.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> MessageId {
        let id = self.messages.len();
        self.messages.push(ChatMessage {
            id,
            role,
            content: content.into(),
            plain: false,
        });
        id
    }

    /// Overwrite the content of an assistant message.
    ///
    /// User messages and notices are immutable; returns `false` if the
    /// message is missing or not an assistant message.
    pub fn set_content(&mut self, id: MessageId, content: impl Into<String>) -> bool {
        match self.messages.get_mut(id) {
            Some(message) if message.role == Role::Assistant => {
                message.content = content.into();
                message.plain = false;
                true
            }
            _ => false,
        }
    }

    /// Like [`Transcript::set_content`], but the text is shown without
    /// markup from now on.
    pub fn set_plain(&mut self, id: MessageId, content: impl Into<String>) -> bool {
        let applied = self.set_content(id, content);
        if let Some(message) = self.messages.get_mut(id).filter(|_| applied) {
            message.plain = true;
        }
        applied
    }

    /// Get a message by id.
    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.get(id)
    }

    /// The most recently appended message.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Iterate messages in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Render the whole transcript as a list of `chat-message` divs.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for message in &self.messages {
            html.push_str(&format!(
                "<div class=\"chat-message {}\"><div class=\"message-content\">\
                 <span class=\"message-text\">{}</span></div></div>\n",
                message.role.css_class(),
                message.rendered()
            ));
        }
        html
    }
}
