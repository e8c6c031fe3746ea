//! Chat Room
//!
//! In-memory fan-out unit of one chat. A single guard serializes membership
//! changes and message ingestion, so every member observes messages in the order
//! they were persisted.
//!
//! ## 設計ノート
//!
//! ファンアウトはメールボックスへの非ブロッキング送信（`try_send`）で行います。
//! 遅いクライアントのメールボックスが満杯の場合はそのクライアント宛てのメッセージのみ
//! 破棄し、ガードを保持したまま待つことはしません。
//!
//! スイープまたはシャットダウンで閉じられた Room は、以後の参加を受け付けません。
//! 閉じるのは Room 自身のガードの下でのみ行います。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{
    Chat, Connection, IdGenerator, IncomingMessage, Message, MessageCodec, MessageId,
    MessageRepository, User, UserId, UserName,
};

use super::{
    config::SessionConfig,
    error::IngestMessageError,
    session::{ClientSession, SessionHandler},
};

/// Collaborators shared by every room of a registry
#[derive(Clone)]
pub struct RoomDependencies {
    pub message_repository: Arc<dyn MessageRepository>,
    pub id_generator: Arc<dyn IdGenerator>,
    pub codec: Arc<dyn MessageCodec>,
    pub session_config: SessionConfig,
}

/// Outcome of [`ChatRoom::admit_user`]
pub enum Admission {
    Admitted(User),
    /// The room was evicted or shut down. The connection is handed back untouched.
    Closed(Box<dyn Connection>),
}

#[derive(Default)]
struct Members {
    /// Key: user id (minted per join, so unique per session)
    sessions: HashMap<UserId, ClientSession>,
    closed: bool,
}

pub struct ChatRoom {
    chat: Chat,
    members: Mutex<Members>,
    deps: RoomDependencies,
}

impl ChatRoom {
    pub fn new(chat: Chat, deps: RoomDependencies) -> Arc<Self> {
        Arc::new(Self {
            chat,
            members: Mutex::new(Members::default()),
            deps,
        })
    }

    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    /// Persist a message, encode it and push it to every member.
    ///
    /// Nothing is pushed unless the store accepted the message. A message that was
    /// stored but cannot be encoded is reported as `Encode` and not pushed.
    /// Members whose mailbox is full miss this message.
    pub async fn ingest_message(
        &self,
        content: String,
        author: User,
    ) -> Result<Message, IngestMessageError> {
        let members = self.members.lock().await;

        let message = Message {
            id: MessageId::new(self.deps.id_generator.new_id()),
            content,
            chat_id: self.chat.id.clone(),
            author,
        };
        self.deps.message_repository.save(message.clone()).await?;
        let payload = self.deps.codec.encode(&message)?;

        for (user_id, session) in members.sessions.iter() {
            match session.deliver(payload.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        "Mailbox of user '{}' in chat '{}' is full, dropping message '{}'",
                        user_id,
                        self.chat.code,
                        message.id.as_str()
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!("Mailbox of user '{}' already closed, skipping", user_id);
                }
            }
        }

        tracing::debug!(
            "Message '{}' broadcast to {} member(s) of chat '{}'",
            message.id.as_str(),
            members.sessions.len(),
            self.chat.code
        );
        Ok(message)
    }

    /// Register a new session for `name` on `connection` and start its pumps.
    ///
    /// A closed room admits nobody and returns the connection.
    pub async fn admit_user(
        self: &Arc<Self>,
        name: UserName,
        connection: Box<dyn Connection>,
    ) -> Admission {
        let mut members = self.members.lock().await;
        if members.closed {
            return Admission::Closed(connection);
        }

        let user = User::new(UserId::new(self.deps.id_generator.new_id()), name);
        let handler: Arc<dyn SessionHandler> = self.clone();
        let (session, pumps) = ClientSession::new(
            user.clone(),
            connection,
            handler,
            Arc::clone(&self.deps.codec),
            &self.deps.session_config,
        );
        members.sessions.insert(user.id.clone(), session);
        pumps.spawn();

        tracing::info!(
            "User '{}' ({}) joined chat '{}'",
            user.name.as_str(),
            user.id,
            self.chat.code
        );
        Admission::Admitted(user)
    }

    /// Close and forget the session of `user_id`.
    ///
    /// Returns `false` when the user was not (or no longer) a member.
    pub async fn remove_user(&self, user_id: &UserId) -> bool {
        let mut members = self.members.lock().await;
        match members.sessions.remove(user_id) {
            Some(session) => {
                session.close();
                tracing::info!(
                    "User '{}' ({}) left chat '{}'",
                    session.user().name.as_str(),
                    user_id,
                    self.chat.code
                );
                true
            }
            None => false,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.members.lock().await.sessions.is_empty()
    }

    pub async fn member_count(&self) -> usize {
        self.members.lock().await.sessions.len()
    }

    /// Close the room if it is empty and its guard is free.
    ///
    /// Never waits: a room whose guard is held is busy, hence not evictable now.
    pub fn try_evict(&self) -> bool {
        let Ok(mut members) = self.members.try_lock() else {
            return false;
        };
        if members.closed || !members.sessions.is_empty() {
            return false;
        }
        members.closed = true;
        true
    }

    /// Close the room and every member's connection
    pub async fn close_all(&self) {
        let mut members = self.members.lock().await;
        members.closed = true;
        let count = members.sessions.len();
        for (_, session) in members.sessions.drain() {
            session.close();
        }
        if count > 0 {
            tracing::info!("Closed {} session(s) of chat '{}'", count, self.chat.code);
        }
    }
}

#[async_trait]
impl SessionHandler for ChatRoom {
    async fn handle_message(
        &self,
        message: IncomingMessage,
        author: User,
    ) -> Result<(), IngestMessageError> {
        self.ingest_message(message.content, author).await.map(|_| ())
    }

    async fn handle_disconnect(&self, user_id: &UserId) {
        self.remove_user(user_id).await;
    }
}
