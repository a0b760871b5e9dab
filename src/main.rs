//! Gemini Chat - chat widget backend
//!
//! Serves the JSON API behind a browser chat widget: the persisted
//! transcript, the light/dark theme preference, and message sends forwarded
//! to a Google Gemini `generateContent` endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;

use config::Config;
use crate::core::{ChatEngine, InMemoryStore, KeyValueStore, SqliteStore};
use providers::GeminiProvider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat_engine: Arc<ChatEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    if config.gemini_endpoint.is_empty() {
        tracing::warn!("GEMINI_ENDPOINT is not set; every send will fail");
    }

    let store: Arc<dyn KeyValueStore> = if config.ephemeral {
        tracing::info!("💾 Widget state kept in memory only");
        Arc::new(InMemoryStore::new())
    } else {
        let db_path = config.database_path();
        tracing::info!("💾 Widget state stored in {}", db_path.display());
        Arc::new(SqliteStore::new(&db_path).await?)
    };

    let client = Arc::new(GeminiProvider::new(config.gemini())?);

    let chat_engine = Arc::new(ChatEngine::new(client, store, config.storage_keys()).await?);
    tracing::info!(
        "📜 Restored {} message(s), theme {}",
        chat_engine.history_len().await,
        chat_engine.theme().await
    );

    let state = AppState { chat_engine };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("💬 Gemini Chat API running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
