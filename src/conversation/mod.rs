//! Conversation types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Prefix of the assistant bubble shown when a completion fails
pub const ERROR_MARKER: &str = "⚠️ Error: ";

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// An assistant message describing a failed exchange
    pub fn error(description: impl std::fmt::Display) -> Self {
        Self::assistant(format!("{}{}", ERROR_MARKER, description))
    }
}
