//! Connection abstraction
//!
//! A bidirectional, message-oriented transport handed to the core by the
//! boundary. It is split into a sending half owned by the write pump and a
//! receiving half owned by the read pump. Deadlines and the read size limit are
//! applied by the pumps.

use async_trait::async_trait;

use super::error::TransportError;

/// A single transport frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

#[async_trait]
pub trait FrameSink: Send {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError>;
}

#[async_trait]
pub trait FrameStream: Send {
    /// Next inbound frame; `None` once the peer has gone away.
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>>;
}

/// An established connection of one client
pub trait Connection: Send {
    fn split(self: Box<Self>) -> (Box<dyn FrameSink>, Box<dyn FrameStream>);
}
