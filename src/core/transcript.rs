//! Transcript manager
//!
//! Keeps the ordered message list in memory and mirrors it to the store as a
//! JSON array after every append.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::conversation::Message;

use super::store::{KeyValueStore, StoreError};

pub struct TranscriptManager {
    store: Arc<dyn KeyValueStore>,
    key: String,
    messages: RwLock<Vec<Message>>,
}

impl TranscriptManager {
    /// Restore the transcript saved under `key`.
    ///
    /// A missing or unparseable value yields an empty transcript; only store
    /// read failures are returned as errors.
    pub async fn restore(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let key = key.into();

        let messages = match store.load(&key).await? {
            Some(saved) => match serde_json::from_str::<Vec<Message>>(&saved) {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!("Discarding unreadable transcript under '{}': {}", key, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        tracing::debug!("Restored {} message(s) from '{}'", messages.len(), key);

        Ok(Self {
            store,
            key,
            messages: RwLock::new(messages),
        })
    }

    /// Append a message and persist the whole transcript.
    ///
    /// The in-memory list only changes once the store write succeeds.
    /// Returns the new transcript length.
    pub async fn append(&self, message: Message) -> Result<usize, StoreError> {
        let mut messages = self.messages.write().await;

        let mut next = messages.clone();
        next.push(message);

        let serialized = serde_json::to_string(&next)?;
        self.store.save(&self.key, &serialized).await?;

        *messages = next;
        Ok(messages.len())
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::InMemoryStore;
    use async_trait::async_trait;

    const KEY: &str = "gemini_chat_history";

    #[tokio::test]
    async fn test_restore_empty_when_absent() {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let transcript = TranscriptManager::restore(store, KEY).await.unwrap();
        assert_eq!(transcript.len().await, 0);
    }

    #[tokio::test]
    async fn test_restore_empty_on_garbage() {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        store.save(KEY, "{not json").await.unwrap();

        let transcript = TranscriptManager::restore(store, KEY).await.unwrap();
        assert!(transcript.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_persists_full_sequence() {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let transcript = TranscriptManager::restore(store.clone(), KEY).await.unwrap();

        assert_eq!(transcript.append(Message::user("Hello")).await.unwrap(), 1);
        assert_eq!(transcript.append(Message::assistant("Hi there!")).await.unwrap(), 2);

        let saved = store.load(KEY).await.unwrap().unwrap();
        assert_eq!(
            saved,
            r#"[{"role":"user","content":"Hello"},{"role":"assistant","content":"Hi there!"}]"#
        );
    }

    #[tokio::test]
    async fn test_restore_matches_saved() {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let original = TranscriptManager::restore(store.clone(), KEY).await.unwrap();

        original.append(Message::user("same")).await.unwrap();
        original.append(Message::user("same")).await.unwrap();
        original.append(Message::assistant("reply")).await.unwrap();

        let restored = TranscriptManager::restore(store, KEY).await.unwrap();
        assert_eq!(restored.messages().await, original.messages().await);
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn save(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    #[tokio::test]
    async fn test_failed_save_leaves_memory_untouched() {
        let transcript = TranscriptManager::restore(Arc::new(FailingStore), KEY)
            .await
            .unwrap();

        assert!(transcript.append(Message::user("lost")).await.is_err());
        assert_eq!(transcript.len().await, 0);
    }
}
