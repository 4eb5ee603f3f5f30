//! HTTP transport for the prediction service.
//!
//! `ReefClient` wraps a `reqwest::Client` with the service base URL and
//! pre-built JSON headers. `predict()` is a plain request/response call;
//! `chat()` and `init_chat()` only build the streaming requests, which
//! [`crate::ChatSession`] sends and decodes.

use crate::ClientError;
use reef::{ChatRequest, InitContext, PredictRequest, PredictResponse};
use reqwest::{
    Client, Method, RequestBuilder,
    header::{self, HeaderMap, HeaderValue},
};
use serde::Serialize;
use url::Url;

/// Endpoint paths, relative to the base URL.
const PREDICT: &str = "predict";
const CHAT: &str = "chat";
const INIT_CHAT: &str = "init-chat";

/// Shared HTTP transport for the prediction and chat endpoints.
#[derive(Debug, Clone)]
pub struct ReefClient {
    client: Client,
    headers: HeaderMap,
    base: Url,
}

impl ReefClient {
    /// Create a client for the service at `base_url`.
    pub fn new(client: Client, base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(Self {
            client,
            headers,
            base,
        })
    }

    /// Resolve an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Request a risk prediction.
    pub async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ClientError> {
        let url = self.endpoint(PREDICT)?;
        tracing::debug!("predict: {}", serde_json::to_string(request)?);
        let response = self
            .client
            .request(Method::POST, url)
            .headers(self.headers.clone())
            .header(header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status { status, body: text });
        }
        tracing::trace!("response: {text}");
        Ok(serde_json::from_str(&text)?)
    }

    /// Build the streaming request for a chat message.
    pub fn chat(&self, request: &ChatRequest) -> Result<RequestBuilder, ClientError> {
        self.stream_request(CHAT, request)
    }

    /// Build the streaming request that seeds a conversation.
    pub fn init_chat(&self, context: &InitContext) -> Result<RequestBuilder, ClientError> {
        self.stream_request(INIT_CHAT, context)
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Get a reference to the default headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn stream_request(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<RequestBuilder, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!("{path}: {}", serde_json::to_string(body)?);
        Ok(self
            .client
            .request(Method::POST, url)
            .headers(self.headers.clone())
            .header(header::ACCEPT, "text/event-stream")
            .json(body))
    }
}
