//! Optional TOML configuration file
//!
//! Lets a deployment pin the endpoint, the env var holding the key, and the
//! storage layout without touching the environment:
//!
//! ```toml
//! [llm]
//! endpoint = "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
//! api_key_env = "MY_GEMINI_KEY"
//! timeout_secs = 60
//!
//! [storage]
//! database = "widget.db"
//! history_key = "gemini_chat_history"
//! theme_key = "theme"
//! ```

use serde::Deserialize;
use std::path::Path;

/// Root of the configuration file; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub llm: LlmSection,

    #[serde(default)]
    pub storage: StorageSection,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmSection {
    /// Completion endpoint URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSection {
    /// Database file name, relative to the data directory
    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub history_key: Option<String>,

    #[serde(default)]
    pub theme_key: Option<String>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
