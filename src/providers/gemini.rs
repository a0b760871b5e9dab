//! Google Gemini `generateContent` provider
//!
//! Each call sends exactly one user turn:
//!
//! ```json
//! { "contents": [{ "role": "user", "parts": [{ "text": "..." }] }] }
//! ```
//!
//! and reads the reply from `candidates[0].content.parts[0].text`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{CompletionClient, ProviderError};

/// JSON pointer to the reply text inside a `generateContent` response
const REPLY_POINTER: &str = "/candidates/0/content/parts/0/text";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn user(text: &'a str) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text }],
            }],
        }
    }
}

/// Reply text pulled out of a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The candidate text was present
    Text(String),
    /// The expected shape was missing; holds the whole body re-serialized
    Fallback(String),
}

impl Reply {
    pub fn into_text(self) -> String {
        match self {
            Reply::Text(text) | Reply::Fallback(text) => text,
        }
    }
}

/// Extract the reply from a `generateContent` response body.
///
/// When the candidate text is missing, empty, or not a string the raw JSON is returned
/// instead, so the user still sees whatever the endpoint said.
pub fn extract_reply(body: &Value) -> Reply {
    match body.pointer(REPLY_POINTER).and_then(Value::as_str) {
        Some(text) if !text.is_empty() => Reply::Text(text.to_string()),
        _ => Reply::Fallback(body.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Full `generateContent` URL
    pub endpoint: String,
    /// Sent as a bearer token
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl CompletionClient for GeminiProvider {
    async fn complete(&self, user_text: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&GenerateRequest::user(user_text))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {} - Body: {}", e, body))
        })?;

        let reply = extract_reply(&json);
        if let Reply::Fallback(_) = reply {
            tracing::warn!("Response had no candidate text, returning raw body");
        }

        Ok(reply.into_text())
    }
}
