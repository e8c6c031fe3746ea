//! In-process fakes shared by the chat engine tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use hiroba_shared::time::FixedClock;

use crate::{
    domain::{
        CodeGenerator, Connection, Frame, FrameSink, FrameStream, IdGenerator, Message,
        MessageRepository, RepositoryError, TransportError,
    },
    infrastructure::{
        codec::JsonMessageCodec,
        repository::{InMemoryChatRepository, InMemoryMessageRepository},
    },
};

use super::{config::SessionConfig, registry::Collaborators, room::RoomDependencies};

/// Frames the fake transport buffers before a write blocks
const FAKE_TRANSPORT_BUFFER: usize = 1024;

/// Connection backed by in-memory channels
pub(crate) struct FakeConnection {
    outbound: mpsc::Sender<Frame>,
    inbound: mpsc::UnboundedReceiver<Result<Frame, TransportError>>,
}

/// Remote end of a [`FakeConnection`]
pub(crate) struct FakePeer {
    to_server: mpsc::UnboundedSender<Result<Frame, TransportError>>,
    from_server: mpsc::Receiver<Frame>,
}

pub(crate) fn fake_connection() -> (Box<dyn Connection>, FakePeer) {
    connection_with_buffer(FAKE_TRANSPORT_BUFFER)
}

/// Connection whose writes block once a single unread frame is buffered
pub(crate) fn stalled_connection() -> (Box<dyn Connection>, FakePeer) {
    connection_with_buffer(1)
}

fn connection_with_buffer(buffer: usize) -> (Box<dyn Connection>, FakePeer) {
    let (outbound_tx, outbound_rx) = mpsc::channel(buffer);
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let connection = FakeConnection {
        outbound: outbound_tx,
        inbound: inbound_rx,
    };
    let peer = FakePeer {
        to_server: inbound_tx,
        from_server: outbound_rx,
    };
    (Box::new(connection), peer)
}

impl Connection for FakeConnection {
    fn split(self: Box<Self>) -> (Box<dyn FrameSink>, Box<dyn FrameStream>) {
        let this = *self;
        (
            Box::new(FakeSink {
                outbound: this.outbound,
            }),
            Box::new(FakeStream {
                inbound: this.inbound,
            }),
        )
    }
}

struct FakeSink {
    outbound: mpsc::Sender<Frame>,
}

#[async_trait]
impl FrameSink for FakeSink {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        self.outbound
            .send(frame)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

struct FakeStream {
    inbound: mpsc::UnboundedReceiver<Result<Frame, TransportError>>,
}

#[async_trait]
impl FrameStream for FakeStream {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        self.inbound.recv().await
    }
}

impl FakePeer {
    pub(crate) fn send_text(&self, text: &str) {
        let _ = self.to_server.send(Ok(Frame::Text(text.to_string())));
    }

    pub(crate) fn send_pong(&self) {
        let _ = self.to_server.send(Ok(Frame::Pong(Vec::new())));
    }

    pub(crate) fn send_close(&self) {
        let _ = self.to_server.send(Ok(Frame::Close));
    }

    pub(crate) fn send_error(&self, error: TransportError) {
        let _ = self.to_server.send(Err(error));
    }

    /// Next frame written by the server, or `None` after `wait`
    pub(crate) async fn next_frame(&mut self, wait: Duration) -> Option<Frame> {
        tokio::time::timeout(wait, self.from_server.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next text frame, skipping keepalive pings
    pub(crate) async fn next_text(&mut self, wait: Duration) -> Option<String> {
        loop {
            match self.next_frame(wait).await? {
                Frame::Text(text) => return Some(text),
                Frame::Ping(_) => continue,
                _ => return None,
            }
        }
    }

    /// Text payloads received within `wait`, split into individual messages
    pub(crate) async fn collect_lines(&mut self, count: usize, wait: Duration) -> Vec<String> {
        let mut lines = Vec::new();
        while lines.len() < count {
            let Some(text) = self.next_text(wait).await else {
                break;
            };
            lines.extend(text.split('\n').map(str::to_string));
        }
        lines
    }
}

/// Deterministic `prefix-N` identifiers
pub(crate) struct SequentialIdGenerator {
    prefix: &'static str,
    counter: AtomicUsize,
}

impl SequentialIdGenerator {
    pub(crate) fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            counter: AtomicUsize::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> String {
        format!("{}-{}", self.prefix, self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl CodeGenerator for SequentialIdGenerator {
    fn new_code(&self) -> String {
        format!("{}{}", self.prefix, self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Code generator replaying a fixed list of codes, then repeating the last one
pub(crate) struct ScriptedCodeGenerator {
    codes: Vec<&'static str>,
    next: AtomicUsize,
}

impl ScriptedCodeGenerator {
    pub(crate) fn new(codes: Vec<&'static str>) -> Self {
        Self {
            codes,
            next: AtomicUsize::new(0),
        }
    }
}

impl CodeGenerator for ScriptedCodeGenerator {
    fn new_code(&self) -> String {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        let index = index.min(self.codes.len() - 1);
        self.codes[index].to_string()
    }
}

/// Message store whose saves take `delay` before reaching the inner store
pub(crate) struct SlowMessageRepository {
    delay: Duration,
    inner: InMemoryMessageRepository,
}

impl SlowMessageRepository {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: InMemoryMessageRepository::new(),
        }
    }
}

#[async_trait]
impl MessageRepository for SlowMessageRepository {
    async fn save(&self, message: Message) -> Result<(), RepositoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.save(message).await
    }
}

pub(crate) fn room_dependencies(message_repository: Arc<dyn MessageRepository>) -> RoomDependencies {
    RoomDependencies {
        message_repository,
        id_generator: Arc::new(SequentialIdGenerator::new("id")),
        codec: Arc::new(JsonMessageCodec::new()),
        session_config: SessionConfig::default(),
    }
}

pub(crate) fn collaborators(
    chat_repository: Arc<InMemoryChatRepository>,
    message_repository: Arc<dyn MessageRepository>,
) -> Collaborators {
    Collaborators {
        chat_repository,
        message_repository,
        id_generator: Arc::new(SequentialIdGenerator::new("id")),
        code_generator: Arc::new(SequentialIdGenerator::new("code")),
        codec: Arc::new(JsonMessageCodec::new()),
        clock: Arc::new(FixedClock::new(1_700_000_000_000)),
    }
}
