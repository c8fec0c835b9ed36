use std::sync::Arc;

use super::{FailingChat, FailingEmbedding, StubSummary};
use rolo_service::{ImportContactsRequest, Providers, Purpose, ScopeMode, SearchRequest};

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn search_survives_embedding_and_rerank_outages() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping search_survives_embedding_and_rerank_outages; set ROLO_PG_DSN to run this test."
		);

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!(
			"Skipping search_survives_embedding_and_rerank_outages; set ROLO_QDRANT_URL to run this test."
		);

		return;
	};
	let providers =
		Providers::new(Arc::new(FailingEmbedding), Arc::new(FailingChat), Arc::new(StubSummary));
	let collection = test_db.collection_name("rolo_acceptance");
	let cfg = super::test_config(test_db.dsn().to_string(), qdrant_url, collection);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let searcher_id = super::create_account(&service, "Searcher").await;

	service
		.import_contacts(ImportContactsRequest {
			account_id: searcher_id,
			contacts: vec![super::import_row(
				"Jane Doe",
				Some("Partner"),
				Some("Sequoia Capital"),
				None,
			)],
		})
		.await
		.expect("Failed to import contacts.");

	// Both optional stages are down. The request still answers from the
	// lexical path alone.
	let response = service
		.search(SearchRequest {
			account_id: searcher_id,
			query: "sequoia".to_string(),
			purpose: Purpose::Any,
			scope: ScopeMode::Extended,
		})
		.await
		.expect("Search failed.");

	assert_eq!(response.results.len(), 1);
	assert_eq!(response.results[0].full_name, "Jane Doe");
	assert!(response.results[0].score > 0.0);
	assert_eq!(response.debug.vector_count, 0);
	assert_eq!(response.debug.keyword_count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
