//! Chat Registry
//!
//! Owns every live [`ChatRoom`], keyed by chat id. Rooms are created with their
//! chat, rebuilt lazily on the first join after a restart, and evicted by a
//! periodic sweep once they have no members.
//!
//! ## ロック
//!
//! レジストリのロックを保持したまま Room のガードを待つことはありません。
//! `join_chat` は Room の `Arc` を取り出してからロックを解放し、Room のガードの下で
//! 参加させます。スイープは `try_evict` で空き、かつガードが空いている Room だけを
//! 閉じるため、参加処理と競合した場合は参加側が閉じた Room を検出して再試行します。

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::{Mutex, oneshot},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

use hiroba_shared::time::Clock;

use crate::domain::{
    Chat, ChatCode, ChatId, ChatRepository, CodeGenerator, Connection, IdGenerator,
    MessageCodec, MessageRepository, RepositoryError, Timestamp, User, UserName,
};

use super::{
    config::RegistryConfig,
    error::{CreateChatError, JoinChatError},
    room::{Admission, ChatRoom, RoomDependencies},
};

/// Attempts at minting an unused chat code before giving up
const MAX_CODE_ATTEMPTS: usize = 5;

/// Stores, generators and codec the registry hands to its rooms
#[derive(Clone)]
pub struct Collaborators {
    pub chat_repository: Arc<dyn ChatRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub id_generator: Arc<dyn IdGenerator>,
    pub code_generator: Arc<dyn CodeGenerator>,
    pub codec: Arc<dyn MessageCodec>,
    pub clock: Arc<dyn Clock>,
}

/// Snapshot of one live room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub chat: Chat,
    pub members: usize,
}

#[derive(Default)]
struct Rooms {
    /// Key: chat id. Never holds a closed room.
    live: HashMap<ChatId, Arc<ChatRoom>>,
    shut_down: bool,
}

struct Sweeper {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct ChatRegistry {
    chat_repository: Arc<dyn ChatRepository>,
    code_generator: Arc<dyn CodeGenerator>,
    id_generator: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    room_dependencies: RoomDependencies,
    sweep_interval: Duration,
    rooms: Mutex<Rooms>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl ChatRegistry {
    pub fn new(collaborators: Collaborators, config: RegistryConfig) -> Self {
        let room_dependencies = RoomDependencies {
            message_repository: collaborators.message_repository,
            id_generator: Arc::clone(&collaborators.id_generator),
            codec: collaborators.codec,
            session_config: config.session,
        };
        Self {
            chat_repository: collaborators.chat_repository,
            code_generator: collaborators.code_generator,
            id_generator: collaborators.id_generator,
            clock: collaborators.clock,
            room_dependencies,
            sweep_interval: config.sweep_interval,
            rooms: Mutex::new(Rooms::default()),
            sweeper: Mutex::new(None),
        }
    }

    /// Create and persist a new chat, and register an empty room for it.
    ///
    /// A code already taken in the store is regenerated, up to
    /// `MAX_CODE_ATTEMPTS` times.
    pub async fn create_chat(&self) -> Result<Chat, CreateChatError> {
        if self.rooms.lock().await.shut_down {
            return Err(CreateChatError::ShuttingDown);
        }

        let chat_id = ChatId::new(self.id_generator.new_id());
        let created_at = Timestamp::new(self.clock.now_millis());

        let mut attempt = 1;
        let chat = loop {
            let chat = Chat::new(
                chat_id.clone(),
                ChatCode::new(self.code_generator.new_code()),
                created_at,
            );
            match self.chat_repository.save(chat.clone()).await {
                Ok(()) => break chat,
                Err(RepositoryError::DuplicateCode(code)) if attempt < MAX_CODE_ATTEMPTS => {
                    tracing::warn!(
                        "Chat code '{}' already taken (attempt {}/{}), regenerating",
                        code,
                        attempt,
                        MAX_CODE_ATTEMPTS
                    );
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!("Failed to store chat '{}': {}", chat_id, error);
                    return Err(error.into());
                }
            }
        };

        let mut rooms = self.rooms.lock().await;
        if rooms.shut_down {
            // The chat is stored; its room is built on the first join after restart.
            return Err(CreateChatError::ShuttingDown);
        }
        let room = ChatRoom::new(chat.clone(), self.room_dependencies.clone());
        rooms.live.insert(chat.id.clone(), room);

        tracing::info!("Chat '{}' created with code '{}'", chat.id, chat.code);
        Ok(chat)
    }

    pub async fn find_chat(&self, code: &ChatCode) -> Result<Chat, JoinChatError> {
        Ok(self.chat_repository.find_by_code(code).await?)
    }

    /// Admit `user_name` into the chat addressed by `code` over `connection`.
    ///
    /// The room is instantiated when the chat exists in the store but has no live
    /// room yet. On error the connection is dropped, which closes it.
    pub async fn join_chat(
        &self,
        code: &ChatCode,
        user_name: UserName,
        connection: Box<dyn Connection>,
    ) -> Result<User, JoinChatError> {
        let chat = self.find_chat(code).await?;

        let mut connection = connection;
        loop {
            let room = {
                let mut rooms = self.rooms.lock().await;
                if rooms.shut_down {
                    return Err(JoinChatError::ShuttingDown);
                }
                let room = rooms.live.entry(chat.id.clone()).or_insert_with(|| {
                    tracing::debug!("Instantiating room for chat '{}'", chat.code);
                    ChatRoom::new(chat.clone(), self.room_dependencies.clone())
                });
                Arc::clone(room)
            };

            match room.admit_user(user_name.clone(), connection).await {
                Admission::Admitted(user) => return Ok(user),
                Admission::Closed(returned) => {
                    tracing::debug!(
                        "Room of chat '{}' closed while joining, retrying",
                        chat.code
                    );
                    connection = returned;
                }
            }
        }
    }

    /// Evict every room without members. Returns the number of evicted rooms.
    ///
    /// Rooms whose guard is held at this instant are busy and left for the next
    /// sweep.
    pub async fn sweep_empty_rooms(&self) -> usize {
        let mut rooms = self.rooms.lock().await;

        let before = rooms.live.len();
        rooms.live.retain(|_, room| {
            if room.try_evict() {
                tracing::debug!("Evicted empty room of chat '{}'", room.chat().code);
                false
            } else {
                true
            }
        });
        let evicted = before - rooms.live.len();

        if evicted > 0 {
            tracing::info!(
                "Sweep evicted {} empty room(s), {} remaining",
                evicted,
                rooms.live.len()
            );
        }
        evicted
    }

    /// Start the periodic empty-room sweep. The first pass runs one interval
    /// after start. Calling this again replaces the running sweeper.
    pub async fn start_sweeper(self: &Arc<Self>) {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let registry = Arc::downgrade(self);
        let period = self.sweep_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if !sweep_once(&registry).await {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Room sweeper stopped");
        });

        let previous = self.sweeper.lock().await.replace(Sweeper {
            stop: stop_tx,
            handle,
        });
        if let Some(previous) = previous {
            let _ = previous.stop.send(());
        }
        tracing::info!("Room sweeper started (every {:?})", period);
    }

    /// Stop the sweeper, then close every room and forget them.
    ///
    /// Joins and chat creations are rejected from the moment this is called.
    pub async fn shutdown(&self) {
        if let Some(sweeper) = self.sweeper.lock().await.take() {
            let _ = sweeper.stop.send(());
            let _ = sweeper.handle.await;
        }

        let closing: Vec<Arc<ChatRoom>> = {
            let mut rooms = self.rooms.lock().await;
            rooms.shut_down = true;
            rooms.live.drain().map(|(_, room)| room).collect()
        };
        for room in &closing {
            room.close_all().await;
        }
        tracing::info!("Registry shut down, {} room(s) closed", closing.len());
    }

    /// Live rooms with their member counts, ordered by chat code
    pub async fn room_summaries(&self) -> Vec<RoomSummary> {
        let rooms: Vec<Arc<ChatRoom>> = self.rooms.lock().await.live.values().cloned().collect();

        let mut summaries = Vec::with_capacity(rooms.len());
        for room in rooms {
            summaries.push(RoomSummary {
                chat: room.chat().clone(),
                members: room.member_count().await,
            });
        }
        summaries.sort_by(|a, b| a.chat.code.cmp(&b.chat.code));
        summaries
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.live.len()
    }

    pub async fn room(&self, chat_id: &ChatId) -> Option<Arc<ChatRoom>> {
        self.rooms.lock().await.live.get(chat_id).cloned()
    }
}

/// Returns `false` once the registry is gone.
async fn sweep_once(registry: &Weak<ChatRegistry>) -> bool {
    match registry.upgrade() {
        Some(registry) => {
            registry.sweep_empty_rooms().await;
            true
        }
        None => false,
    }
}
