//! End-to-end tests for the ingestion API over a real listener.

use std::sync::Arc;

use async_trait::async_trait;
use courier_channel::{
    ChannelAdapter, ChannelError, ChannelEvent, ChannelProbe, ChannelTransport,
};
use courier_http::{create_router, AppState};
use courier_service::{DeliveryService, NotificationService};
use courier_storage::{PendingStore, SqliteStore};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

struct FixedTransport {
    accept: bool,
}

#[async_trait]
impl ChannelTransport for FixedTransport {
    async fn send_text(&self, _recipient: &str, _body: &str) -> Result<(), ChannelError> {
        if self.accept {
            Ok(())
        } else {
            Err(ChannelError::Unavailable("channel down".to_owned()))
        }
    }

    async fn probe(&self) -> Result<ChannelProbe, ChannelError> {
        Err(ChannelError::Unavailable("no probe in tests".to_owned()))
    }
}

/// Store whose enqueue always fails, to drive the fatal path.
struct EnqueueFailingStore {
    inner: SqliteStore,
}

#[async_trait]
impl PendingStore for EnqueueFailingStore {
    async fn enqueue(
        &self,
        _recipient: &str,
        _payload: &str,
    ) -> Result<i64, courier_storage::StorageError> {
        Err(courier_storage::StorageError::Corrupt("disk gone".to_owned()))
    }

    async fn fetch_oldest(
        &self,
        limit: usize,
    ) -> Result<Vec<courier_storage::PendingMessage>, courier_storage::StorageError> {
        self.inner.fetch_oldest(limit).await
    }

    async fn delete(&self, id: i64) -> Result<(), courier_storage::StorageError> {
        self.inner.delete(id).await
    }

    async fn record_failure(
        &self,
        id: i64,
        error: &str,
        max_attempts: u32,
    ) -> Result<(), courier_storage::StorageError> {
        self.inner.record_failure(id, error, max_attempts).await
    }

    async fn count_queued(&self) -> Result<u64, courier_storage::StorageError> {
        self.inner.count_queued().await
    }

    async fn stats(&self) -> Result<courier_storage::QueueStats, courier_storage::StorageError> {
        self.inner.stats().await
    }

    async fn list(
        &self,
        limit: usize,
    ) -> Result<Vec<courier_storage::PendingMessage>, courier_storage::StorageError> {
        self.inner.list(limit).await
    }

    async fn dead_letters(
        &self,
        limit: usize,
    ) -> Result<Vec<courier_storage::PendingMessage>, courier_storage::StorageError> {
        self.inner.dead_letters(limit).await
    }

    async fn requeue_dead(&self) -> Result<u64, courier_storage::StorageError> {
        self.inner.requeue_dead().await
    }

    async fn purge_dead(&self) -> Result<u64, courier_storage::StorageError> {
        self.inner.purge_dead().await
    }
}

struct TestServer {
    base: String,
    store: Arc<SqliteStore>,
    adapter: Arc<ChannelAdapter>,
    fatal: CancellationToken,
    _temp_dir: TempDir,
}

async fn spawn_server(accept_sends: bool) -> TestServer {
    spawn_server_inner(accept_sends, false).await
}

async fn spawn_server_with_broken_enqueue(accept_sends: bool) -> TestServer {
    spawn_server_inner(accept_sends, true).await
}

async fn spawn_server_inner(accept_sends: bool, broken_enqueue: bool) -> TestServer {
    let temp_dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
    let store = Arc::new(SqliteStore::connect(&url).await.unwrap());

    let handler_store: Arc<dyn PendingStore> = if broken_enqueue {
        Arc::new(EnqueueFailingStore { inner: (*store).clone() })
    } else {
        Arc::clone(&store) as Arc<dyn PendingStore>
    };

    let adapter = Arc::new(ChannelAdapter::new(Arc::new(FixedTransport {
        accept: accept_sends,
    })));
    let notifications = NotificationService::new(
        DeliveryService::new(Arc::clone(&adapter)),
        Arc::clone(&handler_store),
    );
    let fatal = CancellationToken::new();
    let state = Arc::new(AppState {
        notifications,
        store: handler_store,
        adapter: Arc::clone(&adapter),
        fatal: fatal.clone(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        store,
        adapter,
        fatal,
        _temp_dir: temp_dir,
    }
}

#[tokio::test]
async fn test_send_immediate_success() {
    // Scenario A: accepting channel, valid request.
    let server = spawn_server(true).await;

    let response = reqwest::Client::new()
        .post(format!("{}/send", server.base))
        .json(&serde_json::json!({"name": "Ana", "number": "5551234", "order": "2 pizzas"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "sent");
    assert_eq!(server.store.count_queued().await.unwrap(), 0);
}

#[tokio::test]
async fn test_send_failure_queues_for_retry() {
    // Scenario B: rejecting channel, valid request.
    let server = spawn_server(false).await;

    let response = reqwest::Client::new()
        .post(format!("{}/send", server.base))
        .json(&serde_json::json!({"name": "Ana", "number": "5551234", "order": "2 pizzas"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "queued");
    assert!(body["id"].is_i64());

    let pending = server.store.fetch_oldest(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].recipient, "5551234");
    assert!(pending[0].payload.contains("Ana"));
    assert!(pending[0].payload.contains("2 pizzas"));
}

#[tokio::test]
async fn test_send_missing_field_is_rejected() {
    // Scenario C: name omitted.
    let server = spawn_server(true).await;

    let response = reqwest::Client::new()
        .post(format!("{}/send", server.base))
        .json(&serde_json::json!({"number": "5551234", "order": "2 pizzas"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("name"));
    assert_eq!(server.store.count_queued().await.unwrap(), 0);
}

#[tokio::test]
async fn test_send_blank_field_is_rejected() {
    let server = spawn_server(true).await;

    let response = reqwest::Client::new()
        .post(format!("{}/send", server.base))
        .json(&serde_json::json!({"name": "Ana", "number": "   ", "order": "2 pizzas"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_enqueue_fault_answers_500_and_trips_fatal() {
    // Rejecting channel forces the enqueue path; the broken store then
    // fails it. The caller gets a detail-free 500 and the process-level
    // fatal handle trips so serve shuts down instead of staying
    // silently lossy.
    let server = spawn_server_with_broken_enqueue(false).await;
    assert!(!server.fatal.is_cancelled());

    let response = reqwest::Client::new()
        .post(format!("{}/send", server.base))
        .json(&serde_json::json!({"name": "Ana", "number": "5551234", "order": "2 pizzas"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "internal server error");
    assert!(server.fatal.is_cancelled());
    assert_eq!(server.store.count_queued().await.unwrap(), 0);
}

#[tokio::test]
async fn test_queued_response_leaves_fatal_untripped() {
    let server = spawn_server(false).await;

    let response = reqwest::Client::new()
        .post(format!("{}/send", server.base))
        .json(&serde_json::json!({"name": "Ana", "number": "5551234", "order": "2 pizzas"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);
    assert!(!server.fatal.is_cancelled());
}

#[tokio::test]
async fn test_health() {
    let server = spawn_server(true).await;
    let response =
        reqwest::get(format!("{}/health", server.base)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_channel_status_reflects_state_machine() {
    let server = spawn_server(true).await;
    server.adapter.initialize();
    server.adapter.handle_event(ChannelEvent::QrChallenge("scan-me".to_owned()));

    let body: serde_json::Value = reqwest::get(format!("{}/api/channel", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["state"], "initializing");
    assert_eq!(body["qr"], "scan-me");

    server.adapter.handle_event(ChannelEvent::Ready);
    let body: serde_json::Value = reqwest::get(format!("{}/api/channel", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["state"], "ready");
    assert!(body.get("qr").is_none());
}

#[tokio::test]
async fn test_queue_endpoints() {
    let server = spawn_server(false).await;

    let dead = server.store.enqueue("5550000", "doomed").await.unwrap();
    server.store.enqueue("5551111", "waiting").await.unwrap();
    server.store.record_failure(dead, "down", 1).await.unwrap();

    let body: serde_json::Value = reqwest::get(format!("{}/api/queue", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["stats"]["queued"], 1);
    assert_eq!(body["stats"]["dead"], 1);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);

    let body: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/queue/requeue-dead", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["requeued"], 1);
    assert_eq!(server.store.count_queued().await.unwrap(), 2);

    server.store.record_failure(dead, "down again", 1).await.unwrap();
    let body: serde_json::Value = reqwest::Client::new()
        .delete(format!("{}/api/queue/dead", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["purged"], 1);
    assert_eq!(server.store.count_queued().await.unwrap(), 1);
}
