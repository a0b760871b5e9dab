//! Chat engine
//!
//! Drives one exchange per user message:
//! 1. Appends the user's message to the transcript
//! 2. Asks the completion client for a reply
//! 3. Appends the reply, or an error bubble if the completion failed
//!
//! Only one exchange runs at a time; a second send while one is in flight is
//! rejected rather than queued. Once accepted, an exchange runs on its own
//! task and completes even if the caller stops waiting for it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::conversation::Message;
use crate::providers::CompletionClient;

use super::store::{KeyValueStore, StoreError};
use super::theme::{Theme, ThemeManager};
use super::transcript::TranscriptManager;

/// Errors from the chat engine
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("A message is already being sent")]
    Busy,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Exchange aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Store keys for the persisted widget state
#[derive(Debug, Clone)]
pub struct StorageKeys {
    pub history: String,
    pub theme: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            history: "gemini_chat_history".to_string(),
            theme: "theme".to_string(),
        }
    }
}

/// The core chat engine
pub struct ChatEngine {
    client: Arc<dyn CompletionClient>,
    transcript: TranscriptManager,
    theme: ThemeManager,
    sending: AtomicBool,
}

/// Owns the engine for the length of an exchange and clears the loading
/// flag when the exchange ends, however it ends
struct SendingGuard(Arc<ChatEngine>);

impl Drop for SendingGuard {
    fn drop(&mut self) {
        self.0.sending.store(false, Ordering::Release);
    }
}

impl ChatEngine {
    /// Build an engine, restoring transcript and theme from `store`
    pub async fn new(
        client: Arc<dyn CompletionClient>,
        store: Arc<dyn KeyValueStore>,
        keys: StorageKeys,
    ) -> Result<Self, StoreError> {
        let transcript = TranscriptManager::restore(store.clone(), keys.history).await?;
        let theme = ThemeManager::restore(store, keys.theme).await?;

        Ok(Self {
            client,
            transcript,
            theme,
            sending: AtomicBool::new(false),
        })
    }

    /// Send a user message and return the assistant message appended for it.
    ///
    /// Completion failures do not fail the send: they are turned into an
    /// assistant message carrying the error description.
    ///
    /// The exchange is spawned, so dropping the returned future does not
    /// cancel it; both messages still land in the transcript.
    pub async fn send(self: &Arc<Self>, text: &str) -> Result<Message, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ChatError::Busy);
        }
        let guard = SendingGuard(Arc::clone(self));
        let text = text.to_string();

        let exchange = tokio::spawn(async move {
            let engine = &guard.0;

            let len = engine.transcript.append(Message::user(text.as_str())).await?;
            tracing::debug!("Sending message #{} ({} bytes)", len, text.len());

            let reply = match engine.client.complete(&text).await {
                Ok(reply) => Message::assistant(reply),
                Err(e) => {
                    tracing::error!("Completion failed: {}", e);
                    Message::error(e)
                }
            };

            engine.transcript.append(reply.clone()).await?;
            Ok::<_, ChatError>(reply)
        });

        exchange.await?
    }

    pub async fn history(&self) -> Vec<Message> {
        self.transcript.messages().await
    }

    pub async fn history_len(&self) -> usize {
        self.transcript.len().await
    }

    /// Whether an exchange is in flight
    pub fn is_loading(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    pub async fn theme(&self) -> Theme {
        self.theme.current().await
    }

    pub async fn toggle_theme(&self) -> Result<Theme, ChatError> {
        Ok(self.theme.toggle().await?)
    }
}
