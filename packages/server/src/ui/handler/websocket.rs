//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State, ws::WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    chat::JoinChatError,
    domain::{ChatCode, UserName},
    infrastructure::connection::WebSocketConnection,
    ui::state::AppState,
};

/// Query parameters for joining a chat
#[derive(Debug, Deserialize)]
pub struct JoinQuery {
    pub code: String,
    pub user: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<JoinQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> UserName (Domain Model)
    let user_name = match UserName::try_from(query.user) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("Rejecting join to chat '{}': {}", query.code, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    let code = ChatCode::new(query.code);

    // 不明なコードはアップグレード前に拒否する
    match state.registry.find_chat(&code).await {
        Ok(_) => {}
        Err(JoinChatError::ChatNotFound(_)) => {
            tracing::warn!("Chat with code '{}' not found", code);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(e) => {
            tracing::error!("Failed to look up chat '{}': {}", code, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    Ok(ws
        .max_message_size(state.max_message_size)
        .on_upgrade(move |socket| async move {
            let connection = Box::new(WebSocketConnection::new(socket));
            if let Err(e) = state.registry.join_chat(&code, user_name, connection).await {
                // The socket was dropped with the connection, which closes it.
                tracing::warn!("Failed to join chat '{}' after upgrade: {}", code, e);
            }
        }))
}
