use std::sync::Arc;

use sqlx::PgPool;

use super::{FailingChat, StubEmbedding, StubSummary, TEST_VECTOR_DIM};
use rolo_service::{ImportContactsRequest, Providers};

async fn outbox_count(pool: &PgPool) -> i64 {
	sqlx::query_scalar("SELECT count(*) FROM embedding_outbox")
		.fetch_one(pool)
		.await
		.expect("Failed to count outbox jobs.")
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn unchanged_reimports_touch_nothing() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping unchanged_reimports_touch_nothing; set ROLO_PG_DSN to run this test.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!("Skipping unchanged_reimports_touch_nothing; set ROLO_QDRANT_URL to run this test.");

		return;
	};
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: TEST_VECTOR_DIM }),
		Arc::new(FailingChat),
		Arc::new(StubSummary),
	);
	let collection = test_db.collection_name("rolo_acceptance");
	let cfg = super::test_config(test_db.dsn().to_string(), qdrant_url, collection);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let account_id = super::create_account(&service, "Searcher").await;
	let row = || {
		super::import_row(
			"Jane Doe",
			Some("Partner"),
			Some("Sequoia Capital"),
			Some("https://linkedin.com/in/janedoe"),
		)
	};
	let first = service
		.import_contacts(ImportContactsRequest { account_id, contacts: vec![row()] })
		.await
		.expect("First import failed.");

	assert_eq!(first.imported, 1);
	assert_eq!(outbox_count(&service.db.pool).await, 1);

	let second = service
		.import_contacts(ImportContactsRequest { account_id, contacts: vec![row()] })
		.await
		.expect("Second import failed.");

	// Same fingerprint: no row churn and no new embedding work.
	assert_eq!(second.imported, 0);
	assert_eq!(second.updated, 0);
	assert_eq!(second.unchanged, 1);
	assert_eq!(outbox_count(&service.db.pool).await, 1);

	let third = service
		.import_contacts(ImportContactsRequest {
			account_id,
			contacts: vec![super::import_row(
				"Jane Doe",
				Some("General Partner"),
				Some("Sequoia Capital"),
				Some("https://linkedin.com/in/janedoe"),
			)],
		})
		.await
		.expect("Third import failed.");

	assert_eq!(third.updated, 1);
	assert_eq!(outbox_count(&service.db.pool).await, 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn rows_without_profile_urls_always_insert() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping rows_without_profile_urls_always_insert; set ROLO_PG_DSN to run this test.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!(
			"Skipping rows_without_profile_urls_always_insert; set ROLO_QDRANT_URL to run this test."
		);

		return;
	};
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: TEST_VECTOR_DIM }),
		Arc::new(FailingChat),
		Arc::new(StubSummary),
	);
	let collection = test_db.collection_name("rolo_acceptance");
	let cfg = super::test_config(test_db.dsn().to_string(), qdrant_url, collection);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let account_id = super::create_account(&service, "Searcher").await;
	let request = || ImportContactsRequest {
		account_id,
		contacts: vec![super::import_row("Jane Doe", Some("Partner"), None, None)],
	};

	// Without a profile URL there is no upsert key, so each import inserts.
	assert_eq!(service.import_contacts(request()).await.expect("First import failed.").imported, 1);
	assert_eq!(
		service.import_contacts(request()).await.expect("Second import failed.").imported,
		1
	);

	let contacts: i64 = sqlx::query_scalar("SELECT count(*) FROM contacts")
		.fetch_one(&service.db.pool)
		.await
		.expect("Failed to count contacts.");

	assert_eq!(contacts, 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
