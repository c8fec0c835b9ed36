use std::{
	future::IntoFuture,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::{Duration, Instant},
};

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};
use uuid::Uuid;

use super::{FailingChat, StubEmbedding, StubSummary, TEST_VECTOR_DIM};
use rolo_config::EmbeddingProviderConfig;
use rolo_service::{ImportContactsRequest, Providers};
use rolo_storage::{contacts, db::Db, qdrant::ContactIndex};
use rolo_worker::worker;

#[derive(FromRow)]
struct OutboxRow {
	status: String,
	attempts: i32,
	last_error: Option<String>,
}

async fn wait_for_status(
	pool: &PgPool,
	contact_id: Uuid,
	status: &str,
	timeout: Duration,
) -> Option<OutboxRow> {
	let deadline = Instant::now() + timeout;

	loop {
		let row: Option<OutboxRow> = sqlx::query_as::<_, OutboxRow>(
			"\
SELECT
	status,
	attempts,
	last_error
FROM embedding_outbox
WHERE contact_id = $1",
		)
		.bind(contact_id)
		.fetch_optional(pool)
		.await
		.ok()
		.flatten();

		if let Some(row) = row
			&& row.status == status
		{
			return Some(row);
		}

		if Instant::now() >= deadline {
			return None;
		}

		tokio::time::sleep(Duration::from_millis(200)).await;
	}
}

async fn start_embed_server(request_count: Arc<AtomicUsize>) -> (String, Sender<()>) {
	let app =
		Router::new().route("/embeddings", routing::post(embed_handler)).with_state(request_count);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind embed server.");
	let addr = listener.local_addr().expect("Failed to read embed server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

async fn embed_handler(
	State(counter): State<Arc<AtomicUsize>>,
	Json(payload): Json<Value>,
) -> impl IntoResponse {
	let call_index = counter.fetch_add(1, Ordering::SeqCst);

	if call_index == 0 {
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	let inputs =
		payload.get("input").and_then(|value| value.as_array()).cloned().unwrap_or_default();
	let data: Vec<_> = inputs
		.iter()
		.enumerate()
		.map(|(index, _)| {
			let embedding: Vec<f32> = vec![0.1_f32; TEST_VECTOR_DIM as usize];

			serde_json::json!({
				"index": index,
				"embedding": embedding
			})
		})
		.collect();

	(StatusCode::OK, Json(serde_json::json!({ "data": data }))).into_response()
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn outbox_retries_to_done() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping outbox_retries_to_done; set ROLO_PG_DSN to run this test.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!("Skipping outbox_retries_to_done; set ROLO_QDRANT_URL to run this test.");

		return;
	};
	let request_count = Arc::new(AtomicUsize::new(0));
	let (api_base, shutdown) = start_embed_server(request_count.clone()).await;
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: TEST_VECTOR_DIM }),
		Arc::new(FailingChat),
		Arc::new(StubSummary),
	);
	let collection = test_db.collection_name("rolo_acceptance");
	let cfg = super::test_config(test_db.dsn().to_string(), qdrant_url, collection);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let account_id = super::create_account(&service, "Searcher").await;
	let report = service
		.import_contacts(ImportContactsRequest {
			account_id,
			contacts: vec![super::import_row(
				"Jane Doe",
				Some("Partner"),
				Some("Sequoia Capital"),
				Some("https://linkedin.com/in/janedoe"),
			)],
		})
		.await
		.expect("Failed to import contact.");

	assert_eq!(report.imported, 1);

	let contact_id: Uuid = sqlx::query_scalar("SELECT contact_id FROM contacts WHERE owner_id = $1")
		.bind(account_id)
		.fetch_one(&service.db.pool)
		.await
		.expect("Failed to read imported contact id.");
	let worker_state = worker::WorkerState {
		db: Db::connect(&service.cfg.storage.postgres).await.expect("Failed to connect worker DB."),
		index: ContactIndex::new(&service.cfg.storage.qdrant)
			.expect("Failed to build contact index."),
		embedding: EmbeddingProviderConfig {
			provider_id: "test".to_string(),
			api_base,
			api_key: "test-key".to_string(),
			path: "/embeddings".to_string(),
			model: "test".to_string(),
			dimensions: TEST_VECTOR_DIM,
			timeout_ms: 1_000,
			default_headers: Map::new(),
		},
	};
	let handle = tokio::spawn(async move {
		let _ = worker::run_worker(worker_state).await;
	});
	let failed = wait_for_status(&service.db.pool, contact_id, "FAILED", Duration::from_secs(5))
		.await
		.expect("Expected FAILED outbox status.");

	assert_eq!(failed.attempts, 1);
	assert!(failed.last_error.is_some());
	assert!(request_count.load(Ordering::SeqCst) >= 1);

	let now = OffsetDateTime::now_utc();

	sqlx::query("UPDATE embedding_outbox SET available_at = $1 WHERE contact_id = $2")
		.bind(now)
		.bind(contact_id)
		.execute(&service.db.pool)
		.await
		.expect("Failed to update available_at.");

	let done = wait_for_status(&service.db.pool, contact_id, "DONE", Duration::from_secs(5))
		.await
		.expect("Expected DONE outbox status.");

	assert!(done.attempts >= 1);

	let contact = contacts::get_contact(&service.db.pool, contact_id)
		.await
		.expect("Failed to load contact.")
		.expect("Contact missing after embedding.");

	assert!(contact.embedded_at.is_some(), "Expected embedded_at after the job completed.");

	handle.abort();

	let _ = shutdown.send(());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
