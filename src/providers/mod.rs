//! Remote completion providers

mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A single-turn text completion backend
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the user's text and return the assistant's reply text
    async fn complete(&self, user_text: &str) -> Result<String, ProviderError>;
}
