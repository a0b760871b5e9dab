//! Light/dark theme preference

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::store::{KeyValueStore, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

/// Holds the current theme and persists every change
pub struct ThemeManager {
    store: Arc<dyn KeyValueStore>,
    key: String,
    current: RwLock<Theme>,
}

impl ThemeManager {
    /// Restore the theme saved under `key`, falling back to light
    pub async fn restore(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let key = key.into();

        let theme: Theme = store
            .load(&key)
            .await?
            .and_then(|saved| saved.parse().ok())
            .unwrap_or_default();

        Ok(Self {
            store,
            key,
            current: RwLock::new(theme),
        })
    }

    pub async fn current(&self) -> Theme {
        *self.current.read().await
    }

    /// Flip the theme and persist it, returning the new value
    pub async fn toggle(&self) -> Result<Theme, StoreError> {
        let mut current = self.current.write().await;
        let next = current.toggle();

        self.store.save(&self.key, next.as_str()).await?;
        *current = next;

        tracing::debug!("Theme switched to {}", next);
        Ok(next)
    }
}
