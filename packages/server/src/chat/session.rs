//! Client Session
//!
//! Binds one user's connection to a room. Two tokio tasks run per session:
//!
//! - read pump: receives frames, keeps the liveness deadline and hands decoded
//!   messages to the [`SessionHandler`]
//! - write pump: drains the mailbox into the connection and sends keepalive pings
//!
//! The pumps share nothing but the mailbox and the session close signal. Each pump
//! notifies the handler of the disconnect once when it terminates, so the handler
//! sees up to two notifications per session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        watch,
    },
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at, timeout, timeout_at},
};

use crate::domain::{
    CodecError, Connection, Frame, FrameSink, FrameStream, IncomingMessage, MessageCodec,
    TransportError, User, UserId,
};

use super::{config::SessionConfig, error::IngestMessageError};

/// Receiver of session events, implemented by the room
#[async_trait]
pub trait SessionHandler: Send + Sync {
    /// A decoded inbound message. An error terminates the read pump.
    async fn handle_message(
        &self,
        message: IncomingMessage,
        author: User,
    ) -> Result<(), IngestMessageError>;

    /// One of the pumps terminated. Must be idempotent.
    async fn handle_disconnect(&self, user_id: &UserId);
}

/// Room-side handle of a running session
pub struct ClientSession {
    user: User,
    mailbox: mpsc::Sender<String>,
    closer: watch::Sender<bool>,
}

/// Pumps of a session that have not been spawned yet
pub struct SessionPumps {
    read: ReadPump,
    write: WritePump,
}

impl ClientSession {
    pub fn new(
        user: User,
        connection: Box<dyn Connection>,
        handler: Arc<dyn SessionHandler>,
        codec: Arc<dyn MessageCodec>,
        config: &SessionConfig,
    ) -> (Self, SessionPumps) {
        let (sink, stream) = connection.split();
        let (mailbox_tx, mailbox_rx) = mpsc::channel(config.mailbox_capacity);
        let (closer, closed) = watch::channel(false);

        let read = ReadPump {
            stream,
            user: user.clone(),
            handler: Arc::clone(&handler),
            codec,
            closed,
            pong_wait: config.pong_wait,
            max_message_size: config.max_message_size,
        };
        let write = WritePump {
            sink,
            mailbox: mailbox_rx,
            user_id: user.id.clone(),
            handler,
            write_wait: config.write_wait,
            ping_period: config.ping_period,
        };

        let session = Self {
            user,
            mailbox: mailbox_tx,
            closer,
        };
        (session, SessionPumps { read, write })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Queue an encoded payload without waiting.
    ///
    /// Fails with `Full` when the peer is not keeping up and with `Closed` once the
    /// write pump is gone.
    pub fn deliver(&self, payload: String) -> Result<(), TrySendError<String>> {
        self.mailbox.try_send(payload)
    }

    /// Signal both pumps to stop. The mailbox closes when the session is dropped.
    pub fn close(&self) {
        self.closer.send_replace(true);
    }
}

impl SessionPumps {
    /// Spawn the read and write pumps
    pub fn spawn(self) -> (JoinHandle<()>, JoinHandle<()>) {
        let read = tokio::spawn(self.read.run());
        let write = tokio::spawn(self.write.run());
        (read, write)
    }
}

/// Why a pump stopped
#[derive(Debug, Error)]
enum PumpExit {
    #[error("session closed")]
    SessionClosed,

    #[error("peer closed the connection")]
    PeerClosed,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] CodecError),

    #[error("message handler failed: {0}")]
    Handler(#[from] IngestMessageError),
}

impl PumpExit {
    fn log(&self, pump: &str, user_id: &UserId) {
        match self {
            Self::SessionClosed | Self::PeerClosed => {
                tracing::debug!(user_id = %user_id, "{} pump terminated: {}", pump, self);
            }
            _ => {
                tracing::warn!(user_id = %user_id, "{} pump terminated: {}", pump, self);
            }
        }
    }
}

struct ReadPump {
    stream: Box<dyn FrameStream>,
    user: User,
    handler: Arc<dyn SessionHandler>,
    codec: Arc<dyn MessageCodec>,
    closed: watch::Receiver<bool>,
    pong_wait: Duration,
    max_message_size: usize,
}

impl ReadPump {
    async fn run(mut self) {
        let exit = self.pump().await;
        exit.log("Read", &self.user.id);
        self.handler.handle_disconnect(&self.user.id).await;
    }

    async fn pump(&mut self) -> PumpExit {
        let mut deadline = Instant::now() + self.pong_wait;

        loop {
            let next = tokio::select! {
                _ = wait_closed(&mut self.closed) => return PumpExit::SessionClosed,
                next = timeout_at(deadline, self.stream.next_frame()) => next,
            };

            let frame = match next {
                Err(_) => return TransportError::Timeout("read").into(),
                Ok(None) => return PumpExit::PeerClosed,
                Ok(Some(Err(e))) => return e.into(),
                Ok(Some(Ok(frame))) => frame,
            };

            let raw = match frame {
                Frame::Pong(_) => {
                    deadline = Instant::now() + self.pong_wait;
                    continue;
                }
                // answered by the transport
                Frame::Ping(_) => continue,
                Frame::Close => return PumpExit::PeerClosed,
                Frame::Text(text) => text,
                Frame::Binary(data) => match String::from_utf8(data) {
                    Ok(text) => text,
                    Err(e) => return CodecError::Decode(e.to_string()).into(),
                },
            };

            if raw.len() > self.max_message_size {
                return TransportError::MessageTooLarge {
                    size: raw.len(),
                    limit: self.max_message_size,
                }
                .into();
            }

            let normalized = normalize_payload(&raw);
            tracing::debug!(user_id = %self.user.id, "Received message: {}", normalized);

            let message = match self.codec.decode(&normalized) {
                Ok(message) => message,
                Err(e) => return e.into(),
            };

            if let Err(e) = self
                .handler
                .handle_message(message, self.user.clone())
                .await
            {
                return e.into();
            }
        }
    }
}

struct WritePump {
    sink: Box<dyn FrameSink>,
    mailbox: mpsc::Receiver<String>,
    user_id: UserId,
    handler: Arc<dyn SessionHandler>,
    write_wait: Duration,
    ping_period: Duration,
}

impl WritePump {
    async fn run(mut self) {
        let exit = self.pump().await;
        exit.log("Write", &self.user_id);
        self.handler.handle_disconnect(&self.user_id).await;
    }

    async fn pump(&mut self) -> PumpExit {
        let mut ticker = interval_at(Instant::now() + self.ping_period, self.ping_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                received = self.mailbox.recv() => {
                    let Some(first) = received else {
                        if let Err(e) = self.send(Frame::Close).await {
                            tracing::debug!(user_id = %self.user_id, "Failed to send close frame: {}", e);
                        }
                        return PumpExit::SessionClosed;
                    };
                    let payload = self.coalesce(first);
                    if let Err(e) = self.send(Frame::Text(payload)).await {
                        return e.into();
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.send(Frame::Ping(Vec::new())).await {
                        return e.into();
                    }
                }
            }
        }
    }

    /// Append the messages already queued at this instant to `first`, one per line.
    fn coalesce(&mut self, first: String) -> String {
        let queued = self.mailbox.len();
        let mut payload = first;
        for _ in 0..queued {
            match self.mailbox.try_recv() {
                Ok(next) => {
                    payload.push('\n');
                    payload.push_str(&next);
                }
                Err(_) => break,
            }
        }
        payload
    }

    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        match timeout(self.write_wait, self.sink.send(frame)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout("write")),
        }
    }
}

/// Resolves once the session is closed or its handle dropped
async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    let _ = closed.wait_for(|closed| *closed).await;
}

/// Collapse embedded newlines into spaces and trim surrounding whitespace
fn normalize_payload(raw: &str) -> String {
    raw.replace('\n', " ").trim().to_string()
}
