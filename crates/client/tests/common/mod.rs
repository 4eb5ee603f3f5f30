//! In-process stand-in for the prediction service.

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, Uri, header},
    response::Response,
    routing::post,
};
use reefwatch_client::{ChatSession, Client, ReefClient, SessionObserver};
use reef::{ChatMessage, Role, StreamEvent};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::mpsc;

/// A canned reply for the next request.
pub enum Reply {
    /// Stream these chunks, then end the body.
    Chunks(Vec<Vec<u8>>),
    /// Stream these chunks, then keep the body open forever.
    Hang(Vec<Vec<u8>>),
    /// Answer with an empty body and this status.
    Status(u16),
    /// Answer with a JSON body.
    Json(serde_json::Value),
    /// Never answer; the request waits for headers forever.
    Stall,
}

impl Reply {
    /// Stream the given events, one chunk each.
    pub fn events(events: &[StreamEvent]) -> Self {
        Self::Chunks(events.iter().map(|e| e.to_line().into_bytes()).collect())
    }

    /// Stream raw text chunks.
    pub fn text(chunks: &[&str]) -> Self {
        Self::Chunks(chunks.iter().map(|c| c.as_bytes().to_vec()).collect())
    }
}

/// A request the backend received.
#[derive(Debug, Clone)]
pub struct Received {
    pub path: String,
    pub body: serde_json::Value,
}

#[derive(Default)]
struct Inner {
    replies: VecDeque<Reply>,
    received: Vec<Received>,
}

/// Scripted backend shared between the server task and the test.
#[derive(Clone, Default)]
pub struct Backend {
    inner: Arc<Mutex<Inner>>,
}

impl Backend {
    /// Queue the reply for the next request.
    pub fn reply(&self, reply: Reply) -> &Self {
        self.inner.lock().unwrap().replies.push_back(reply);
        self
    }

    /// Requests received so far.
    pub fn received(&self) -> Vec<Received> {
        self.inner.lock().unwrap().received.clone()
    }

    /// Serve on an ephemeral port and return the base URL.
    pub async fn serve(&self) -> String {
        let app = Router::new()
            .route("/predict", post(handle))
            .route("/chat", post(handle))
            .route("/init-chat", post(handle))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn handle(State(backend): State<Backend>, uri: Uri, body: Bytes) -> Response {
    let reply = {
        let mut inner = backend.inner.lock().unwrap();
        inner.received.push(Received {
            path: uri.path().to_owned(),
            body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
        });
        inner.replies.pop_front()
    };

    match reply {
        Some(Reply::Chunks(chunks)) => event_stream(chunks, false),
        Some(Reply::Hang(chunks)) => event_stream(chunks, true),
        Some(Reply::Status(code)) => Response::builder()
            .status(code)
            .body(Body::empty())
            .unwrap(),
        Some(Reply::Stall) => std::future::pending().await,
        Some(Reply::Json(value)) => Response::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::empty())
            .unwrap(),
    }
}

fn event_stream(chunks: Vec<Vec<u8>>, hang: bool) -> Response {
    let stream = async_stream::stream! {
        for chunk in chunks {
            yield Ok::<_, std::io::Error>(Bytes::from(chunk));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        if hang {
            std::future::pending::<()>().await;
        }
    };
    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(stream))
        .unwrap()
}

/// What an observer saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seen {
    Busy(bool),
    Appended(Role, String),
    Updated(String),
}

/// Observer forwarding everything to a channel.
pub struct Recorder {
    tx: mpsc::UnboundedSender<Seen>,
}

impl Recorder {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Seen>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SessionObserver for Recorder {
    fn busy_changed(&self, busy: bool) {
        let _ = self.tx.send(Seen::Busy(busy));
    }

    fn message_appended(&self, message: &ChatMessage) {
        let _ = self
            .tx
            .send(Seen::Appended(message.role, message.content.clone()));
    }

    fn message_updated(&self, message: &ChatMessage) {
        let _ = self.tx.send(Seen::Updated(message.content.clone()));
    }
}

/// Wait until the observer reports the first reply update.
pub async fn first_update(seen: &mut mpsc::UnboundedReceiver<Seen>) {
    while let Some(event) = seen.recv().await {
        if matches!(event, Seen::Updated(_)) {
            return;
        }
    }
    panic!("observer channel closed before any update");
}

/// Drain everything the observer has reported so far.
pub fn drain(seen: &mut mpsc::UnboundedReceiver<Seen>) -> Vec<Seen> {
    let mut events = Vec::new();
    while let Ok(event) = seen.try_recv() {
        events.push(event);
    }
    events
}

/// Wait until the backend has received `count` requests.
pub async fn requests(backend: &Backend, count: usize) {
    while backend.received().len() < count {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Build a client for a served backend.
pub fn client(base_url: &str) -> ReefClient {
    ReefClient::new(Client::new(), base_url).unwrap()
}

/// Build a session with a recording observer.
pub fn session(base_url: &str) -> (ChatSession<Recorder>, mpsc::UnboundedReceiver<Seen>) {
    let (observer, seen) = Recorder::new();
    (ChatSession::new(client(base_url), observer), seen)
}

/// Content of every message, in transcript order.
pub fn contents<O: SessionObserver>(session: &ChatSession<O>) -> Vec<(Role, String)> {
    session
        .transcript()
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect()
}
