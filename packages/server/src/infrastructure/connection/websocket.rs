//! axum WebSocket を使った Connection 実装
//!
//! WebSocket の受付（upgrade）は UI 層で行われます。
//! この実装は確立済みの `WebSocket` を受け取り、送信側と受信側に分割します。

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::ws::{Message, WebSocket},
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};

use crate::domain::{Connection, Frame, FrameSink, FrameStream, TransportError};

/// Established WebSocket connection of one client
pub struct WebSocketConnection {
    socket: WebSocket,
}

impl WebSocketConnection {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl Connection for WebSocketConnection {
    fn split(self: Box<Self>) -> (Box<dyn FrameSink>, Box<dyn FrameStream>) {
        let (sink, stream) = self.socket.split();
        (
            Box::new(WebSocketSink { sink }),
            Box::new(WebSocketStream { stream }),
        )
    }
}

struct WebSocketSink {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl FrameSink for WebSocketSink {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        self.sink
            .send(into_ws_message(frame))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

struct WebSocketStream {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl FrameStream for WebSocketStream {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        self.stream.next().await.map(|result| {
            result
                .map(from_ws_message)
                .map_err(|e| TransportError::Io(e.to_string()))
        })
    }
}

fn into_ws_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(data) => Message::Binary(Bytes::from(data)),
        Frame::Ping(data) => Message::Ping(Bytes::from(data)),
        Frame::Pong(data) => Message::Pong(Bytes::from(data)),
        Frame::Close => Message::Close(None),
    }
}

fn from_ws_message(message: Message) -> Frame {
    match message {
        Message::Text(text) => Frame::Text(text.as_str().to_string()),
        Message::Binary(data) => Frame::Binary(data.to_vec()),
        Message::Ping(data) => Frame::Ping(data.to_vec()),
        Message::Pong(data) => Frame::Pong(data.to_vec()),
        Message::Close(_) => Frame::Close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_round_trips_through_ws_message() {
        // テスト項目: 各フレーム種別が axum の Message と相互変換できる
        // given (前提条件):
        let frames = vec![
            Frame::Text("hello".to_string()),
            Frame::Binary(vec![1, 2, 3]),
            Frame::Ping(vec![]),
            Frame::Pong(vec![9]),
            Frame::Close,
        ];

        for frame in frames {
            // when (操作):
            let converted = from_ws_message(into_ws_message(frame.clone()));

            // then (期待する結果):
            assert_eq!(converted, frame);
        }
    }
}
