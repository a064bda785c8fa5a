//! UseCase テスト用の共通フィクスチャ

use std::sync::Arc;

use codesync_shared::time::ManualClock;
use tokio::sync::mpsc;

use crate::{
    domain::{
        MessagePusher, ParticipantId, RoomId, RoomRegistry, RoomStore, StoredRoom, Timestamp,
    },
    infrastructure::{
        message_pusher::ChannelMessagePusher,
        repository::{InMemoryRoomRegistry, InMemoryRoomStore, InMemorySessionIndex},
    },
};

use super::Broadcaster;

pub const T0: i64 = 1_700_000_000_000;

pub struct TestContext {
    pub store: Arc<InMemoryRoomStore>,
    pub registry: Arc<InMemoryRoomRegistry>,
    pub sessions: Arc<InMemorySessionIndex>,
    pub pusher: Arc<ChannelMessagePusher>,
    pub broadcaster: Arc<Broadcaster>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    pub fn new() -> Self {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let pusher = Arc::new(ChannelMessagePusher::new());
        Self {
            store: Arc::new(InMemoryRoomStore::new()),
            broadcaster: Arc::new(Broadcaster::new(registry.clone(), pusher.clone())),
            registry,
            sessions: Arc::new(InMemorySessionIndex::new()),
            pusher,
            clock: Arc::new(ManualClock::new(T0)),
        }
    }

    /// 永続化された Room を作成する（レジストリにはまだ載せない）
    pub async fn stored_room(&self, id: &str) -> RoomId {
        let room_id = RoomId::new(id.to_string()).unwrap();
        self.store
            .create_room(StoredRoom::new(
                room_id.clone(),
                "Test".to_string(),
                "javascript".to_string(),
                Timestamp::new(T0),
            ))
            .await
            .unwrap();
        room_id
    }

    /// 永続化し、レジストリにも載せた Room を作成する
    pub async fn loaded_room(&self, id: &str) -> RoomId {
        let room_id = self.stored_room(id).await;
        let stored = self.store.find_room(&room_id).await.unwrap().unwrap();
        self.registry.ensure_loaded(stored).await;
        room_id
    }

    /// 参加者のイベントチャンネルを登録し、受信側を返す
    pub async fn open_channel(&self, id: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(64);
        self.pusher.register_client(pid(id), tx).await;
        rx
    }
}

pub fn pid(id: &str) -> ParticipantId {
    ParticipantId::new(id.to_string()).unwrap()
}

/// 受信済みのイベントを全て取り出して JSON として返す
pub fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<serde_json::Value> {
    let mut events = Vec::new();
    while let Ok(raw) = rx.try_recv() {
        events.push(serde_json::from_str(&raw).unwrap());
    }
    events
}

/// 指定した type のイベントだけを取り出す
pub fn of_type<'a>(events: &'a [serde_json::Value], kind: &str) -> Vec<&'a serde_json::Value> {
    events.iter().filter(|e| e["type"] == kind).collect()
}
