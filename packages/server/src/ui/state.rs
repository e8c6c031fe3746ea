//! Shared handler state.

use std::sync::Arc;

use crate::chat::ChatRegistry;

pub struct AppState {
    /// Registry（チャットと Room の管理）
    pub registry: Arc<ChatRegistry>,
    /// WebSocket 受信フレームの最大サイズ（バイト）
    pub max_message_size: usize,
}
