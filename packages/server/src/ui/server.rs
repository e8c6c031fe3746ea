//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::chat::ChatRegistry;

use super::{
    handler::{create_chat, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// Chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(registry, 512);
/// server.run("127.0.0.1".to_string(), 8080, Duration::from_secs(10)).await?;
/// ```
pub struct Server {
    /// Registry（チャットと Room の管理）
    registry: Arc<ChatRegistry>,
    /// WebSocket 受信フレームの最大サイズ（バイト）
    max_message_size: usize,
}

impl Server {
    pub fn new(registry: Arc<ChatRegistry>, max_message_size: usize) -> Self {
        Self {
            registry,
            max_message_size,
        }
    }

    /// Routes of the chat boundary
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            registry: Arc::clone(&self.registry),
            max_message_size: self.max_message_size,
        });

        Router::new()
            // WebSocket エンドポイント（GET）とチャット作成（POST）
            .route("/chats", get(websocket_handler).post(create_chat))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Bind to `host:port` and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(
        self,
        host: String,
        port: u16,
        shutdown_timeout: Duration,
    ) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Create a chat with: POST http://{}/chats", bind_addr);
        tracing::info!("Join with: ws://{}/chats?code=<code>&user=<name>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal(), shutdown_timeout)
            .await
    }

    /// Serve on `listener` until `signal` resolves.
    ///
    /// The listener stops accepting first. Upgraded WebSocket connections are not
    /// tracked by axum, so the registry is shut down afterwards, closing every
    /// session and rejecting joins from upgrades still in flight.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        signal: F,
        shutdown_timeout: Duration,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        tracing::info!("Chat server listening on {}", listener.local_addr()?);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await;
        tracing::info!("Listener closed, shutting down registry");

        if tokio::time::timeout(shutdown_timeout, self.registry.shutdown())
            .await
            .is_err()
        {
            tracing::warn!(
                "Registry shutdown did not finish within {:?}",
                shutdown_timeout
            );
        }
        served?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
