//! Application configuration

pub mod file;

use std::env;
use std::path::PathBuf;

use serde::Serialize;

pub use file::{ConfigError, FileConfig};

use crate::core::StorageKeys;
use crate::providers::GeminiConfig;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini_endpoint: String,
    #[serde(skip_serializing)]
    pub gemini_api_key: String,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
    pub database: String,
    pub history_key: String,
    pub theme_key: String,
    /// Keep widget state in memory instead of SQLite
    pub ephemeral: bool,
}

impl Config {
    /// Read the environment, then apply the file named by `CHAT_CONFIG` if set.
    ///
    /// The endpoint and key are not validated; an empty endpoint surfaces as
    /// an error bubble on the first send.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_vars(|name| env::var(name).ok());

        if let Ok(path) = env::var("CHAT_CONFIG") {
            let file = FileConfig::from_file(&PathBuf::from(&path))?;
            config.apply(file, |name| env::var(name).ok());
            tracing::info!("Loaded configuration file {}", path);
        }

        Ok(config)
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let keys = StorageKeys::default();

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(3000),
            gemini_endpoint: var("GEMINI_ENDPOINT").unwrap_or_default(),
            gemini_api_key: var("GEMINI_API_KEY").unwrap_or_default(),
            request_timeout_secs: var("CHAT_REQUEST_TIMEOUT_SECS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(120),
            data_dir: var("CHAT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            database: "chat.db".into(),
            history_key: keys.history,
            theme_key: keys.theme,
            ephemeral: matches!(var("CHAT_EPHEMERAL").as_deref(), Some("1" | "true")),
        }
    }

    /// Overlay values from a configuration file
    fn apply(&mut self, file: FileConfig, var: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = file.llm.endpoint {
            self.gemini_endpoint = endpoint;
        }
        if let Some(key) = file.llm.api_key_env.and_then(|name| var(&name)) {
            self.gemini_api_key = key;
        }
        if let Some(timeout) = file.llm.timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(database) = file.storage.database {
            self.database = database;
        }
        if let Some(key) = file.storage.history_key {
            self.history_key = key;
        }
        if let Some(key) = file.storage.theme_key {
            self.theme_key = key;
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database)
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            endpoint: self.gemini_endpoint.clone(),
            api_key: self.gemini_api_key.clone(),
            timeout_secs: self.request_timeout_secs,
        }
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys {
            history: self.history_key.clone(),
            theme: self.theme_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[]));

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.gemini_endpoint, "");
        assert_eq!(config.gemini_api_key, "");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.database_path(), PathBuf::from("./data/chat.db"));
        assert_eq!(config.history_key, "gemini_chat_history");
        assert_eq!(config.theme_key, "theme");
        assert!(!config.ephemeral);
    }

    #[test]
    fn test_environment_values() {
        let config = Config::from_vars(vars(&[
            ("PORT", "8080"),
            ("GEMINI_ENDPOINT", "https://example.test/generate"),
            ("GEMINI_API_KEY", "secret"),
            ("CHAT_DATA_DIR", "/var/lib/chat"),
            ("CHAT_REQUEST_TIMEOUT_SECS", "not a number"),
            ("CHAT_EPHEMERAL", "true"),
        ]));

        assert!(config.ephemeral);

        assert_eq!(config.port, 8080);
        assert_eq!(config.gemini().endpoint, "https://example.test/generate");
        assert_eq!(config.gemini().api_key, "secret");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/chat/chat.db"));
    }

    #[test]
    fn test_file_overrides_environment() {
        let var = vars(&[("GEMINI_API_KEY", "from-env"), ("ALT_KEY", "from-file-env")]);
        let mut config = Config::from_vars(&var);

        let file = FileConfig::from_toml(
            r#"
[llm]
endpoint = "https://example.test/other"
api_key_env = "ALT_KEY"

[storage]
database = "widget.db"
theme_key = "widget_theme"
"#,
        )
        .unwrap();
        config.apply(file, &var);

        assert_eq!(config.gemini_endpoint, "https://example.test/other");
        assert_eq!(config.gemini_api_key, "from-file-env");
        assert_eq!(config.database, "widget.db");
        assert_eq!(config.storage_keys().theme, "widget_theme");
        assert_eq!(config.storage_keys().history, "gemini_chat_history");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = Config::from_vars(vars(&[("GEMINI_API_KEY", "secret")]));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
