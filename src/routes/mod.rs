//! API routes
//!
//! The JSON surface the browser widget renders from.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::conversation::Message;
use crate::core::{ChatError, Theme};
use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: Message,
    pub history_len: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
    /// True while a reply is pending; drives the typing indicator
    pub loading: bool,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

/// `ChatError` rendered as `{ "error": ... }` with a matching status
pub struct ApiError(ChatError);

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
            ChatError::Busy => StatusCode::CONFLICT,
            ChatError::Store(_) | ChatError::Aborted(_) => {
                tracing::error!("{}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        messages: state.chat_engine.history().await,
        loading: state.chat_engine.is_loading(),
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = state.chat_engine.send(&request.message).await?;
    let history_len = state.chat_engine.history_len().await;

    Ok(Json(ChatResponse {
        message,
        history_len,
    }))
}

async fn theme(State(state): State<AppState>) -> Json<ThemeResponse> {
    Json(ThemeResponse {
        theme: state.chat_engine.theme().await,
    })
}

async fn toggle_theme(State(state): State<AppState>) -> Result<Json<ThemeResponse>, ApiError> {
    Ok(Json(ThemeResponse {
        theme: state.chat_engine.toggle_theme().await?,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/history", get(history))
        .route("/v1/chat", post(chat))
        .route("/v1/theme", get(theme))
        .route("/v1/theme/toggle", post(toggle_theme))
}
