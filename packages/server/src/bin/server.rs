//! Hiroba group chat server.
//!
//! Chats are created with `POST /chats` and joined over WebSocket with
//! `GET /chats?code=<code>&user=<name>`. Every message is broadcast to all
//! members of the chat, including its author.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --sweep-interval 30
//! cargo run --bin hiroba-server -- --database hiroba.db
//! ```
//!
//! Without `--database`, chats and messages live in memory and are lost on exit.

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;

use hiroba_server::{
    chat::{ChatRegistry, Collaborators, RegistryConfig, SessionConfig},
    domain::{ChatRepository, MessageRepository},
    infrastructure::{
        codec::JsonMessageCodec,
        generator::{ShortCodeGenerator, UuidIdGenerator},
        repository::{InMemoryChatRepository, InMemoryMessageRepository, SqliteDatabase},
    },
    ui::Server,
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Group chat server with broadcast support", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds between keepalive pings (must be less than --pong-wait)
    #[arg(long, default_value = "45")]
    ping_period: u64,

    /// Seconds a client may stay silent before it is disconnected
    #[arg(long, default_value = "60")]
    pong_wait: u64,

    /// Seconds allowed for a single write to a client
    #[arg(long, default_value = "10")]
    write_wait: u64,

    /// Maximum size of an inbound message in bytes
    #[arg(long, default_value = "512")]
    max_message_size: usize,

    /// Outbound messages buffered per client before new ones are dropped
    #[arg(long, default_value = "256")]
    mailbox_capacity: usize,

    /// Seconds between sweeps of empty rooms
    #[arg(long, default_value = "60")]
    sweep_interval: u64,

    /// Seconds allowed for closing every session on shutdown
    #[arg(long, default_value = "10")]
    shutdown_timeout: u64,

    /// SQLite file to persist chats and messages in (created if missing)
    #[arg(long)]
    database: Option<PathBuf>,
}

impl Args {
    fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            sweep_interval: Duration::from_secs(self.sweep_interval),
            session: SessionConfig {
                write_wait: Duration::from_secs(self.write_wait),
                pong_wait: Duration::from_secs(self.pong_wait),
                ping_period: Duration::from_secs(self.ping_period),
                max_message_size: self.max_message_size,
                mailbox_capacity: self.mailbox_capacity,
            },
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("hiroba_server", env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let config = args.registry_config();
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Initialize dependencies in order:
    // 1. Store (SQLite or in-memory) / generators / codec
    // 2. Registry (+ sweeper)
    // 3. Server
    let database = match &args.database {
        Some(path) => match SqliteDatabase::open(path).await {
            Ok(database) => Some(database),
            Err(e) => {
                tracing::error!("Failed to open database {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let (chat_repository, message_repository): (
        Arc<dyn ChatRepository>,
        Arc<dyn MessageRepository>,
    ) = match &database {
        Some(database) => (
            Arc::new(database.chat_repository()),
            Arc::new(database.message_repository()),
        ),
        None => (
            Arc::new(InMemoryChatRepository::new()),
            Arc::new(InMemoryMessageRepository::new()),
        ),
    };

    let collaborators = Collaborators {
        chat_repository,
        message_repository,
        id_generator: Arc::new(UuidIdGenerator),
        code_generator: Arc::new(ShortCodeGenerator),
        codec: Arc::new(JsonMessageCodec::new()),
        clock: Arc::new(SystemClock),
    };

    let registry = Arc::new(ChatRegistry::new(collaborators, config));
    registry.start_sweeper().await;

    let server = Server::new(registry, args.max_message_size);
    let served = server
        .run(
            args.host,
            args.port,
            Duration::from_secs(args.shutdown_timeout),
        )
        .await;

    // 全セッションを閉じた後にストアを閉じる
    if let Some(database) = database {
        database.close().await;
    }

    if let Err(e) = served {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
