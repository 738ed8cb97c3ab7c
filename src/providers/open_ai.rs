use crate::config::LlmConfig;
use crate::error::ScribeError;
use log::{debug, warn};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Body, Client, Response, StatusCode};
use serde_json::Value;

const CHAT_PATH: &str = "/v1/chat/completions";
const SPEECH_PATH: &str = "/v1/audio/speech";

/// A successful upstream answer, passed on untouched
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Vec<u8>,
}

/// Forwards request bodies to an OpenAI-compatible API with the server's key
pub struct OpenAIProxy {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAIProxy {
    /// Create a new proxy from configuration
    pub fn new(config: &LlmConfig) -> Self {
        Self::with_base_url(config.api_key.clone(), config.base_url.clone())
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        OpenAIProxy {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Relays a chat-completion request; status, content type and body come
    /// back exactly as the upstream sent them
    pub async fn chat(&self, body: impl Into<Body>) -> Result<UpstreamReply, ScribeError> {
        let response = self.forward(CHAT_PATH, body).await?;
        Ok(UpstreamReply {
            status: response.status(),
            content_type: response.headers().get(CONTENT_TYPE).cloned(),
            body: response.bytes().await?.to_vec(),
        })
    }

    /// Relays a text-to-speech request; returns the audio bytes
    pub async fn speech(&self, body: impl Into<Body>) -> Result<Vec<u8>, ScribeError> {
        let response = self.forward(SPEECH_PATH, body).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn forward(&self, path: &str, body: impl Into<Body>) -> Result<Response, ScribeError> {
        let api_key = self.api_key.as_deref().ok_or(ScribeError::MissingCredential)?;

        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        debug!("POST {} -> {}", path, status);
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = upstream_error_message(&text)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Upstream API error".to_string());
        warn!("Upstream {} failed with {}: {}", path, status, message);

        Err(ScribeError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}

/// `error.message` (or a string `error`) from an API error body, else the
/// raw body text
fn upstream_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| match &json["error"] {
            Value::String(message) => Some(message.clone()),
            error => error["message"].as_str().map(str::to_string),
        });
    Some(message.unwrap_or_else(|| body.to_string()))
}
