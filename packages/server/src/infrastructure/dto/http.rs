//! HTTP API response DTOs.

use serde::Serialize;

/// Response of `POST /chats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDto {
    pub id: String,
    pub code: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

/// Entry of `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub chat_id: String,
    pub code: String,
    pub members: usize,
}
