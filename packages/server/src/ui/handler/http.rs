//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    chat::CreateChatError,
    infrastructure::dto::http::{ChatDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a chat and return its join code
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ChatDto>), StatusCode> {
    match state.registry.create_chat().await {
        Ok(chat) => Ok((StatusCode::CREATED, Json(ChatDto::from(chat)))),
        Err(CreateChatError::ShuttingDown) => {
            tracing::warn!("Rejecting chat creation during shutdown");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(e) => {
            tracing::error!("Failed to create chat: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get list of live rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    // Domain Model から DTO への変換
    let rooms = state
        .registry
        .room_summaries()
        .await
        .into_iter()
        .map(RoomSummaryDto::from)
        .collect();
    Json(rooms)
}
