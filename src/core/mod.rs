//! Core widget state
//!
//! The persistent store, the transcript and theme kept in it, and the chat
//! engine that ties them to a completion client.

mod chat;
mod store;
mod theme;
mod transcript;

pub use chat::{ChatEngine, ChatError, StorageKeys};
pub use store::{InMemoryStore, KeyValueStore, SqliteStore, StoreError};
pub use theme::Theme;
