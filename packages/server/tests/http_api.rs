//! HTTP API tests against an in-process server bound to an ephemeral port.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use codesync_server::{
    app::Application,
    config::ServerConfig,
    domain::{CodeRunner, CodeRunnerError, ExecutionOutput, ExecutionRequest},
    ui::router,
};
use codesync_shared::time::SystemClock;
use serde_json::{Value, json};

/// CodeRunner that echoes the submitted code
struct EchoRunner;

#[async_trait]
impl CodeRunner for EchoRunner {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionOutput, CodeRunnerError> {
        if request.language == "slow" {
            return Err(CodeRunnerError::Timeout);
        }
        Ok(ExecutionOutput {
            stdout: request.code,
            stderr: String::new(),
            exit_code: 0,
        })
    }
}

/// Helper struct to manage an in-process server
struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let config = ServerConfig {
            idle_timeout: Duration::from_millis(200),
            ..ServerConfig::default()
        };
        let application =
            Application::with_code_runner(&config, Arc::new(SystemClock), Arc::new(EchoRunner));
        let app = router(application.app_state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            handle,
        }
    }

    async fn get(&self, path: &str) -> Value {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    async fn post(&self, path: &str, body: Value) -> Value {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    async fn create_room(&self, name: &str) -> String {
        let room = self.post("/api/rooms", json!({ "name": name })).await;
        room["id"].as_str().unwrap().to_string()
    }

    async fn join(&self, room_id: &str, user_id: &str) -> Value {
        self.post(
            "/api/rooms/join",
            json!({ "room_id": room_id, "user_id": user_id, "user_name": user_id.to_uppercase() }),
        )
        .await
    }

    async fn open_sse(&self, user_id: &str) -> SseReader {
        let response = self
            .client
            .get(format!("{}/api/sse/{}", self.base_url, user_id))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/event-stream"));
        SseReader {
            response,
            buffer: String::new(),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Minimal reader for `data:` lines of a Server-Sent Events response
struct SseReader {
    response: reqwest::Response,
    buffer: String,
}

impl SseReader {
    /// Next event payload as JSON
    async fn next_event(&mut self) -> Value {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..end + 2).collect();
                let data: String = block
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(str::trim_start)
                    .collect();
                if !data.is_empty() {
                    return serde_json::from_str(&data).unwrap();
                }
                continue;
            }
            let chunk = tokio::time::timeout(Duration::from_secs(5), self.response.chunk())
                .await
                .expect("timed out waiting for an event")
                .unwrap()
                .expect("event stream ended");
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    /// Next event that is not a keep-alive
    async fn next_room_event(&mut self) -> Value {
        loop {
            let event = self.next_event().await;
            if event["type"] != "ping" {
                return event;
            }
        }
    }
}

/// Wait until the SSE handler has registered the stream
async fn wait_for_connections(server: &TestServer, expected: u64) {
    for _ in 0..50 {
        let health = server.get("/health").await;
        if health["active_connections"].as_u64() == Some(expected) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("stream was not registered");
}

#[tokio::test]
async fn test_root_and_health() {
    // テスト項目: サービス情報とヘルスチェックが返される
    // given (前提条件):
    let server = TestServer::start().await;
    server.create_room("Test").await;

    // when (操作):
    let root = server.get("/").await;
    let health = server.get("/health").await;

    // then (期待する結果):
    assert_eq!(root["status"], "running");
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["database"], "connected");
    assert_eq!(health["active_rooms"], 1);
    assert_eq!(health["active_connections"], 0);
}

#[tokio::test]
async fn test_create_get_and_join_room() {
    // テスト項目: 作成した Room を取得・参加でき、参加応答に参加者一覧が含まれる
    // given (前提条件):
    let server = TestServer::start().await;
    let room_id = server.create_room("Test").await;

    // when (操作):
    let room = server.get(&format!("/api/rooms/{}", room_id)).await;
    server.join(&room_id, "a").await;
    let joined = server.join(&room_id, "b").await;

    // then (期待する結果):
    assert_eq!(room["name"], "Test");
    assert_eq!(room["language"], "javascript");
    assert_eq!(joined["room_name"], "Test");
    assert_eq!(joined["user_name"], "B");
    let users: Vec<&str> = joined["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["user_id"].as_str().unwrap())
        .collect();
    assert_eq!(users, vec!["a", "b"]);
}

#[tokio::test]
async fn test_soft_errors_use_status_200() {
    // テスト項目: 未知の Room や不正なチャットは HTTP 200 の {"error": ...} で返される
    // given (前提条件):
    let server = TestServer::start().await;
    let room_id = server.create_room("Test").await;
    server.join(&room_id, "a").await;

    // when (操作):
    let unknown = server
        .post(
            "/api/rooms/join",
            json!({ "room_id": "missing", "user_id": "a", "user_name": "A" }),
        )
        .await;
    let too_long = server
        .post(
            "/api/send-chat-message",
            json!({ "room_id": room_id, "user_id": "a", "user_name": "A", "message": "x".repeat(201) }),
        )
        .await;
    let empty = server
        .post(
            "/api/send-chat-message",
            json!({ "room_id": room_id, "user_id": "a", "user_name": "A", "message": "   " }),
        )
        .await;

    // then (期待する結果):
    assert_eq!(unknown, json!({ "error": "Room not found" }));
    assert_eq!(
        too_long,
        json!({ "error": "Message too long (max 200 characters)" })
    );
    assert_eq!(empty, json!({ "error": "Message cannot be empty" }));
}

#[tokio::test]
async fn test_events_are_streamed_over_sse() {
    // テスト項目: チャットとコード更新が SSE で他の参加者に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let room_id = server.create_room("Test").await;
    let mut a_events = server.open_sse("a").await;
    wait_for_connections(&server, 1).await;
    server.join(&room_id, "a").await;
    server.join(&room_id, "b").await;

    // when (操作):
    let sent = server
        .post(
            "/api/send-chat-message",
            json!({ "room_id": room_id, "user_id": "b", "user_name": "B", "message": "hi" }),
        )
        .await;
    server
        .post(
            "/api/rooms/code",
            json!({ "room_id": room_id, "user_id": "b", "code": "x=1" }),
        )
        .await;

    // then (期待する結果):
    assert_eq!(sent["success"], true);
    let joined = a_events.next_room_event().await;
    assert_eq!(joined["type"], "user_joined");
    assert_eq!(joined["data"]["user_id"], "b");
    let chat = a_events.next_room_event().await;
    assert_eq!(chat["type"], "chat_message");
    assert_eq!(chat["data"]["message"], "hi");
    assert_eq!(chat["data"]["id"], sent["message_id"]);
    let code = a_events.next_room_event().await;
    assert_eq!(code["type"], "code_updated");
    assert_eq!(code["data"]["code"], "x=1");
    assert_eq!(code["data"]["user_name"], "B");
}

#[tokio::test]
async fn test_idle_stream_sends_keep_alive() {
    // テスト項目: イベントが無い間はキープアライブの ping が送られる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut events = server.open_sse("a").await;

    // when (操作):
    let event = events.next_event().await;

    // then (期待する結果):
    assert_eq!(event, json!({ "type": "ping" }));
}

#[tokio::test]
async fn test_leave_room_closes_stream() {
    // テスト項目: 退出するとイベントストリームの登録が外れる
    // given (前提条件):
    let server = TestServer::start().await;
    let room_id = server.create_room("Test").await;
    let _events = server.open_sse("a").await;
    wait_for_connections(&server, 1).await;
    server.join(&room_id, "a").await;

    // when (操作):
    let left = server
        .post(
            "/api/leave-room",
            json!({ "room_id": room_id, "user_id": "a", "user_name": "A" }),
        )
        .await;

    // then (期待する結果):
    assert_eq!(left["success"], true);
    assert_eq!(left["message"], "Left room successfully");
    wait_for_connections(&server, 0).await;
}

#[tokio::test]
async fn test_save_and_run_code() {
    // テスト項目: 保存したコードが取得でき、実行結果と実行失敗が返される
    // given (前提条件):
    let server = TestServer::start().await;
    let room_id = server.create_room("Test").await;
    server.join(&room_id, "a").await;
    server
        .post(
            "/api/rooms/code",
            json!({ "room_id": room_id, "user_id": "a", "code": "print(1)" }),
        )
        .await;

    // when (操作):
    let saved = server
        .post(&format!("/api/rooms/{}/save", room_id), json!({}))
        .await;
    let room = server.get(&format!("/api/rooms/{}", room_id)).await;
    let ran = server
        .post(
            "/api/run-code",
            json!({ "language": "python", "code": "print(1)" }),
        )
        .await;
    let timed_out = server
        .post("/api/run-code", json!({ "language": "slow", "code": "" }))
        .await;

    // then (期待する結果):
    assert_eq!(saved["message"], "File saved successfully");
    assert_eq!(room["code"], "print(1)");
    assert_eq!(ran["stdout"], "print(1)");
    assert_eq!(ran["exit_code"], 0);
    assert_eq!(timed_out["stdout"], "");
    assert_eq!(timed_out["stderr"], "Code execution timed out");
    assert_eq!(timed_out["exit_code"], 1);
}
