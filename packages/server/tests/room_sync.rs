//! End-to-end tests of the room synchronization engine.
//!
//! The use cases are wired the same way the server binary wires them; event
//! streams are real `EventStream`s and time is driven by a `ManualClock`.

use std::{sync::Arc, time::Duration};

use codesync_server::{
    domain::{DisplayName, MessagePusher, ParticipantId, RoomId, RoomRegistry},
    infrastructure::{
        message_pusher::{ChannelMessagePusher, EventStream, StreamFrame},
        repository::{InMemoryRoomRegistry, InMemoryRoomStore, InMemorySessionIndex},
    },
    usecase::{
        Broadcaster, CreateRoomUseCase, JoinRoomUseCase, PresenceReconciler,
        SendChatMessageUseCase, UpdateCodeUseCase,
    },
};
use codesync_shared::time::ManualClock;

const T0: i64 = 1_700_000_000_000;

/// Helper struct wiring the engine for a test
struct Engine {
    registry: Arc<InMemoryRoomRegistry>,
    pusher: Arc<ChannelMessagePusher>,
    clock: Arc<ManualClock>,
    create_room: CreateRoomUseCase,
    join_room: JoinRoomUseCase,
    send_chat: SendChatMessageUseCase,
    update_code: UpdateCodeUseCase,
    reconciler: PresenceReconciler,
}

impl Engine {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let store = Arc::new(InMemoryRoomStore::new());
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let sessions = Arc::new(InMemorySessionIndex::new());
        let pusher = Arc::new(ChannelMessagePusher::new());
        let broadcaster = Arc::new(Broadcaster::new(registry.clone(), pusher.clone()));

        Self {
            create_room: CreateRoomUseCase::new(store.clone(), registry.clone(), clock.clone()),
            join_room: JoinRoomUseCase::new(
                store.clone(),
                registry.clone(),
                sessions.clone(),
                broadcaster.clone(),
            ),
            send_chat: SendChatMessageUseCase::new(
                registry.clone(),
                sessions.clone(),
                broadcaster.clone(),
                clock.clone(),
            ),
            update_code: UpdateCodeUseCase::new(
                store,
                registry.clone(),
                sessions.clone(),
                broadcaster.clone(),
                clock.clone(),
            ),
            reconciler: PresenceReconciler::new(
                registry.clone(),
                sessions,
                pusher.clone(),
                broadcaster,
                clock.clone(),
                Duration::from_secs(10),
            ),
            registry,
            pusher,
            clock,
        }
    }

    async fn open_stream(&self, id: &str) -> EventStream {
        EventStream::open(
            self.pusher.clone(),
            pid(id),
            64,
            Duration::from_secs(30),
        )
        .await
    }

    async fn join(&self, room_id: &RoomId, id: &str) {
        self.join_room
            .execute(
                room_id.clone(),
                pid(id),
                DisplayName::new(id.to_uppercase()).unwrap(),
            )
            .await
            .unwrap();
    }
}

fn pid(id: &str) -> ParticipantId {
    ParticipantId::new(id.to_string()).unwrap()
}

/// Collect the events already queued on a stream, without waiting for keep-alives.
async fn queued_events(stream: &mut EventStream) -> Vec<serde_json::Value> {
    let mut events = Vec::new();
    while let Ok(Some(frame)) =
        tokio::time::timeout(Duration::from_millis(50), stream.next_frame()).await
    {
        match frame {
            StreamFrame::Event(payload) => events.push(serde_json::from_str(&payload).unwrap()),
            StreamFrame::KeepAlive => break,
        }
    }
    events
}

fn of_type<'a>(events: &'a [serde_json::Value], kind: &str) -> Vec<&'a serde_json::Value> {
    events.iter().filter(|e| e["type"] == kind).collect()
}

#[tokio::test]
async fn test_chat_and_code_updates_reach_participants() {
    // テスト項目: チャットは A と B の両方に届き、B のコード更新は A に届く
    // given (前提条件):
    let engine = Engine::new();
    let room = engine
        .create_room
        .execute("Test".to_string(), None)
        .await
        .unwrap();
    let mut a_stream = engine.open_stream("a").await;
    engine.join(&room.id, "a").await;
    let mut b_stream = engine.open_stream("b").await;
    engine.join(&room.id, "b").await;

    // when (操作):
    engine
        .send_chat
        .execute(room.id.clone(), pid("a"), None, "hi".to_string())
        .await
        .unwrap();
    engine
        .update_code
        .execute(room.id.clone(), pid("b"), None, "x=1".to_string())
        .await
        .unwrap();

    // then (期待する結果):
    let a_events = queued_events(&mut a_stream).await;
    let b_events = queued_events(&mut b_stream).await;

    for events in [&a_events, &b_events] {
        let chats = of_type(events, "chat_message");
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0]["data"]["message"], "hi");
        assert_eq!(chats[0]["data"]["user_name"], "A");
    }

    let joined = of_type(&a_events, "user_joined");
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0]["data"]["user_id"], "b");

    let updates = of_type(&a_events, "code_updated");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["data"]["code"], "x=1");
    assert_eq!(updates[0]["data"]["user_name"], "B");
    assert!(of_type(&b_events, "code_updated").is_empty());

    assert_eq!(engine.registry.document(&room.id).await.unwrap(), "x=1");
}

#[tokio::test]
async fn test_closed_stream_is_evicted_once() {
    // テスト項目: leave せずにストリームを閉じた参加者は次の巡回で 1 回だけ user_left になる
    // given (前提条件):
    let engine = Engine::new();
    let room = engine
        .create_room
        .execute("Test".to_string(), None)
        .await
        .unwrap();
    let mut a_stream = engine.open_stream("a").await;
    engine.join(&room.id, "a").await;
    let mut b_stream = engine.open_stream("b").await;
    engine.join(&room.id, "b").await;
    let c_stream = engine.open_stream("c").await;
    engine.join(&room.id, "c").await;
    queued_events(&mut a_stream).await;
    queued_events(&mut b_stream).await;

    // when (操作):
    drop(c_stream);
    for _ in 0..50 {
        if !engine.pusher.is_registered(&pid("c")).await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    engine.clock.advance(30_000);
    let first = engine.reconciler.run_once().await;
    engine.clock.advance(30_000);
    let second = engine.reconciler.run_once().await;

    // then (期待する結果):
    assert_eq!(first.evicted, vec![(room.id.clone(), pid("c"))]);
    assert!(second.evicted.is_empty());
    assert_eq!(
        engine.registry.participant_ids(&room.id).await.unwrap(),
        vec![pid("a"), pid("b")]
    );

    for stream in [&mut a_stream, &mut b_stream] {
        let events = queued_events(stream).await;
        let left = of_type(&events, "user_left");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0]["data"]["user_id"], "c");
        assert_eq!(left[0]["data"]["users"].as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_reopened_stream_replaces_previous_one() {
    // テスト項目: 同じ参加者が新しいストリームを開くと古いストリームは終了し、新しい方にだけ届く
    // given (前提条件):
    let engine = Engine::new();
    let room = engine
        .create_room
        .execute("Test".to_string(), None)
        .await
        .unwrap();
    let mut old_stream = engine.open_stream("a").await;
    engine.join(&room.id, "a").await;

    // when (操作):
    let mut new_stream = engine.open_stream("a").await;
    engine
        .send_chat
        .execute(room.id.clone(), pid("a"), None, "again".to_string())
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(old_stream.next_frame().await, None);
    let events = queued_events(&mut new_stream).await;
    assert_eq!(of_type(&events, "chat_message").len(), 1);

    // 古いストリームの後片付けで新しい登録が消えないこと
    drop(old_stream);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(engine.pusher.is_registered(&pid("a")).await);
}
