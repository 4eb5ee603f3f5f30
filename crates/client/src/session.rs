//! Streaming chat session controller.
//!
//! A session runs at most one exchange at a time. The active exchange is
//! held as [`SessionState::Streaming`] with the cancellation token its read
//! loop checks at every suspension point. Every exit path (completion,
//! error, cancellation, or the future being dropped) goes through
//! [`ExchangeGuard`], which restores [`SessionState::Idle`] and tells the
//! observer the session is ready again.

use crate::{ClientError, ReefClient, SessionError};
use futures_util::StreamExt;
use parking_lot::Mutex;
use reef::{
    ChatMessage, ChatRequest, EventDecoder, InitContext, MessageId, Role, StreamEvent, Transcript,
};
use reqwest::RequestBuilder;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Notice appended when the user cancels a reply.
pub const CANCELLED_NOTICE: &str = "Response generation was cancelled.";

/// Notice appended when a chat reply fails to stream.
const CHAT_FAILED_NOTICE: &str = "Sorry, I encountered an error. Please try again.";

/// Notice appended when the greeting fails to stream.
const INIT_FAILED_NOTICE: &str =
    "Sorry, I encountered an error starting the conversation. Please try again.";

/// Whether an exchange is in flight.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// Ready to send.
    #[default]
    Idle,
    /// An exchange is streaming; cancelling the token stops it.
    Streaming(CancellationToken),
}

/// How an exchange ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The stream ended normally.
    Completed,
    /// The user cancelled the exchange.
    Cancelled,
    /// The call arrived while another exchange was streaming and was
    /// treated as a request to cancel it.
    CancelRequested,
    /// The message was empty; nothing was sent.
    Ignored,
}

/// Label of the send/cancel action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionLabel {
    /// Ready to send a message.
    Send,
    /// A reply is streaming and can be cancelled.
    Cancel,
}

impl ActionLabel {
    /// The label for the given busy state.
    pub fn for_busy(busy: bool) -> Self {
        if busy { Self::Cancel } else { Self::Send }
    }

    /// Button text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "Send",
            Self::Cancel => "Cancel",
        }
    }
}

/// Receives the UI-visible effects of a session.
///
/// All methods default to no-ops. `()` ignores everything.
pub trait SessionObserver {
    /// An exchange started (`true`) or finished (`false`). While busy the
    /// input is disabled and the action button reads "Cancel".
    fn busy_changed(&self, _busy: bool) {}

    /// A message was appended to the transcript.
    fn message_appended(&self, _message: &ChatMessage) {}

    /// The streaming assistant message changed.
    fn message_updated(&self, _message: &ChatMessage) {}
}

impl SessionObserver for () {}

/// Cloneable handle that cancels whatever exchange is active.
#[derive(Debug, Clone)]
pub struct Canceller {
    slot: Arc<Mutex<SessionState>>,
}

impl Canceller {
    /// Cancel the active exchange. Returns `false` if none was active.
    pub fn cancel(&self) -> bool {
        match &*self.slot.lock() {
            SessionState::Streaming(token) => {
                token.cancel();
                true
            }
            SessionState::Idle => false,
        }
    }
}

/// Which endpoint an exchange streams from.
#[derive(Debug, Clone, Copy)]
enum Exchange {
    Chat,
    Init,
}

impl Exchange {
    fn failure_notice(self) -> &'static str {
        match self {
            Exchange::Chat => CHAT_FAILED_NOTICE,
            Exchange::Init => INIT_FAILED_NOTICE,
        }
    }
}

/// How the read loop stopped without an error.
enum Flow {
    Completed,
    Cancelled,
}

/// A chat session with the assistant.
pub struct ChatSession<O = ()> {
    client: ReefClient,
    observer: O,
    transcript: Mutex<Transcript>,
    slot: Arc<Mutex<SessionState>>,
}

impl<O: SessionObserver> ChatSession<O> {
    /// Create a session with an empty transcript.
    pub fn new(client: ReefClient, observer: O) -> Self {
        Self {
            client,
            observer,
            transcript: Mutex::new(Transcript::new()),
            slot: Arc::new(Mutex::new(SessionState::Idle)),
        }
    }

    /// Send a user message and stream the reply.
    ///
    /// While another exchange is streaming the call cancels it instead,
    /// like pressing the action button while it reads "Cancel".
    pub async fn send_message(&self, text: &str) -> Result<Outcome, SessionError> {
        if self.cancel() {
            return Ok(Outcome::CancelRequested);
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(Outcome::Ignored);
        }
        let Some(guard) = self.begin() else {
            return Ok(Outcome::CancelRequested);
        };

        self.append(Role::User, text);
        let reply = self.append(Role::Assistant, "");
        let request = self.client.chat(&ChatRequest::new(text));
        self.run(request, reply, &guard.token, Exchange::Chat).await
    }

    /// Alias of [`ChatSession::send_message`] named after the action button.
    pub async fn submit(&self, text: &str) -> Result<Outcome, SessionError> {
        self.send_message(text).await
    }

    /// Seed the conversation with a greeting about an assessment.
    ///
    /// No user message is appended. Fails with [`SessionError::Busy`] if an
    /// exchange is already streaming.
    pub async fn init_session(&self, context: &InitContext) -> Result<Outcome, SessionError> {
        let guard = self.begin().ok_or(SessionError::Busy)?;
        let reply = self.append(Role::Assistant, "");
        let request = self.client.init_chat(context);
        self.run(request, reply, &guard.token, Exchange::Init).await
    }

    /// Cancel the active exchange, if any. Returns whether one was active.
    pub fn cancel(&self) -> bool {
        self.canceller().cancel()
    }

    /// A handle that can cancel exchanges from elsewhere.
    pub fn canceller(&self) -> Canceller {
        Canceller {
            slot: self.slot.clone(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.slot.lock().clone()
    }

    /// Whether an exchange is streaming.
    pub fn is_streaming(&self) -> bool {
        matches!(*self.slot.lock(), SessionState::Streaming(_))
    }

    /// Current label of the action button.
    pub fn action_label(&self) -> ActionLabel {
        ActionLabel::for_busy(self.is_streaming())
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Transcript {
        self.transcript.lock().clone()
    }

    /// The session observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &ReefClient {
        &self.client
    }

    /// Claim the exchange slot, or `None` if it is taken.
    fn begin(&self) -> Option<ExchangeGuard<'_, O>> {
        let token = {
            let mut slot = self.slot.lock();
            if matches!(*slot, SessionState::Streaming(_)) {
                return None;
            }
            let token = CancellationToken::new();
            *slot = SessionState::Streaming(token.clone());
            token
        };
        self.observer.busy_changed(true);
        Some(ExchangeGuard {
            session: self,
            token,
        })
    }

    /// Stream one exchange into `reply` and record its outcome.
    async fn run(
        &self,
        request: Result<RequestBuilder, ClientError>,
        reply: MessageId,
        token: &CancellationToken,
        exchange: Exchange,
    ) -> Result<Outcome, SessionError> {
        match self.stream(request, reply, token).await {
            Ok(Flow::Completed) => {
                tracing::debug!("exchange completed");
                Ok(Outcome::Completed)
            }
            Ok(Flow::Cancelled) => {
                tracing::debug!("exchange cancelled");
                self.append(Role::Notice, CANCELLED_NOTICE);
                Ok(Outcome::Cancelled)
            }
            Err(SessionError::Remote(message)) => {
                tracing::warn!("assistant error: {message}");
                Err(SessionError::Remote(message))
            }
            Err(e) => {
                tracing::error!("exchange failed: {e}");
                self.append(Role::Notice, exchange.failure_notice());
                Err(e)
            }
        }
    }

    /// The read loop. Returns at end of body, on an error event, on a
    /// transport error, or as soon as `token` is cancelled.
    async fn stream(
        &self,
        request: Result<RequestBuilder, ClientError>,
        reply: MessageId,
        token: &CancellationToken,
    ) -> Result<Flow, SessionError> {
        let request = request?;
        let response = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(Flow::Cancelled),
            response = request.send() => response.map_err(ClientError::from)?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                body: String::new(),
            }
            .into());
        }

        let mut body = response.bytes_stream();
        let mut decoder = EventDecoder::new();
        let mut buffer = String::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(Flow::Cancelled),
                next = body.next() => next,
            };
            match next {
                Some(chunk) => {
                    let chunk = chunk.map_err(ClientError::from)?;
                    self.apply(reply, &mut buffer, decoder.feed(&chunk))?;
                }
                None => {
                    self.apply(reply, &mut buffer, decoder.finish())?;
                    return Ok(Flow::Completed);
                }
            }
        }
    }

    /// Apply decoded events to the reply, re-rendering from the whole
    /// buffer each time. Stops at the first error event.
    fn apply(
        &self,
        reply: MessageId,
        buffer: &mut String,
        events: Vec<StreamEvent>,
    ) -> Result<(), SessionError> {
        for event in events {
            match event {
                StreamEvent::Content(fragment) => {
                    buffer.push_str(&fragment);
                    self.update(reply, |transcript| {
                        transcript.set_content(reply, buffer.as_str())
                    });
                }
                StreamEvent::Error(message) => {
                    // Shown verbatim, never as markup.
                    self.update(reply, |transcript| {
                        transcript.set_plain(reply, format!("Error: {message}"))
                    });
                    return Err(SessionError::Remote(message));
                }
            }
        }
        Ok(())
    }

    fn append(&self, role: Role, content: &str) -> MessageId {
        let (id, message) = {
            let mut transcript = self.transcript.lock();
            let id = transcript.push(role, content);
            (id, transcript.get(id).cloned())
        };
        if let Some(message) = message {
            self.observer.message_appended(&message);
        }
        id
    }

    fn update(&self, id: MessageId, edit: impl FnOnce(&mut Transcript) -> bool) {
        let message = {
            let mut transcript = self.transcript.lock();
            edit(&mut transcript);
            transcript.get(id).cloned()
        };
        if let Some(message) = message {
            self.observer.message_updated(&message);
        }
    }
}

/// Releases the exchange slot when dropped.
struct ExchangeGuard<'a, O: SessionObserver> {
    session: &'a ChatSession<O>,
    token: CancellationToken,
}

impl<O: SessionObserver> Drop for ExchangeGuard<'_, O> {
    fn drop(&mut self) {
        *self.session.slot.lock() = SessionState::Idle;
        self.session.observer.busy_changed(false);
    }
}
