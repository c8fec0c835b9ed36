use std::sync::{Arc, atomic::Ordering};

use serde_json::json;

use super::{FailingChat, ScriptedChat, StubEmbedding, StubSummary, TEST_VECTOR_DIM};
use rolo_service::{
	CandidateSource, ImportContactsRequest, Providers, Purpose, ScopeMode, SearchRequest,
};

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn investor_search_stacks_boosts_and_annotates() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping investor_search_stacks_boosts_and_annotates; set ROLO_PG_DSN to run this test.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!(
			"Skipping investor_search_stacks_boosts_and_annotates; set ROLO_QDRANT_URL to run this test."
		);

		return;
	};
	let chat = Arc::new(ScriptedChat::new(json!({
		"selections": [{ "index": 1, "reason": "Active fintech investor" }],
	})));
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: TEST_VECTOR_DIM }),
		chat.clone(),
		Arc::new(StubSummary),
	);
	let collection = test_db.collection_name("rolo_acceptance");
	let cfg = super::test_config(test_db.dsn().to_string(), qdrant_url, collection);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let searcher_id = super::create_account(&service, "Searcher").await;

	service
		.import_contacts(ImportContactsRequest {
			account_id: searcher_id,
			contacts: vec![
				super::import_row("Jane Doe", Some("Partner"), Some("Sequoia Capital"), None),
				super::import_row("Bob Baker", Some("Engineer"), Some("Acme"), None),
			],
		})
		.await
		.expect("Failed to import contacts.");

	let response = service
		.search(SearchRequest {
			account_id: searcher_id,
			query: "investors".to_string(),
			purpose: Purpose::RaiseFunds,
			scope: ScopeMode::Extended,
		})
		.await
		.expect("Search failed.");

	// keyword 20 + purpose 15 + seniority(partner) 12 + prestige 5.
	assert_eq!(response.results.len(), 1);

	let jane = &response.results[0];

	assert_eq!(jane.full_name, "Jane Doe");
	assert_eq!(jane.score, 52.0);
	assert_eq!(jane.match_reason, "AI Match: Active fintech investor");
	assert_eq!(jane.source, CandidateSource::Own);
	assert_eq!(response.debug.keyword_count, 1);
	assert_eq!(response.debug.vector_count, 0);
	assert_eq!(response.debug.identity, "Searcher");
	assert_eq!(chat.calls.load(Ordering::SeqCst), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn empty_rerank_selection_empties_the_results() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping empty_rerank_selection_empties_the_results; set ROLO_PG_DSN to run this test.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!(
			"Skipping empty_rerank_selection_empties_the_results; set ROLO_QDRANT_URL to run this test."
		);

		return;
	};
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: TEST_VECTOR_DIM }),
		Arc::new(ScriptedChat::new(json!({ "selections": [] }))),
		Arc::new(StubSummary),
	);
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

	let response = service
		.search(SearchRequest {
			account_id: searcher_id,
			query: "investors".to_string(),
			purpose: Purpose::RaiseFunds,
			scope: ScopeMode::Extended,
		})
		.await
		.expect("Search failed.");

	// The model saw a non-empty pool and selected no one.
	assert!(response.results.is_empty());
	assert_eq!(response.debug.keyword_count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn rerank_failure_keeps_the_retrieval_ranking() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping rerank_failure_keeps_the_retrieval_ranking; set ROLO_PG_DSN to run this test.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!(
			"Skipping rerank_failure_keeps_the_retrieval_ranking; set ROLO_QDRANT_URL to run this test."
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

	let response = service
		.search(SearchRequest {
			account_id: searcher_id,
			query: "investors".to_string(),
			purpose: Purpose::RaiseFunds,
			scope: ScopeMode::Extended,
		})
		.await
		.expect("Search failed.");

	assert_eq!(response.results.len(), 1);
	assert_eq!(response.results[0].score, 52.0);
	assert!(response.results[0].match_reason.contains("Matches term: partner"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn one_char_queries_skip_semantic_and_rerank() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping one_char_queries_skip_semantic_and_rerank; set ROLO_PG_DSN to run this test.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!(
			"Skipping one_char_queries_skip_semantic_and_rerank; set ROLO_QDRANT_URL to run this test."
		);

		return;
	};
	// Empty selections would wipe the results if the reranker ran at all.
	let chat = Arc::new(ScriptedChat::new(json!({ "selections": [] })));
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: TEST_VECTOR_DIM }),
		chat.clone(),
		Arc::new(StubSummary),
	);
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

	let response = service
		.search(SearchRequest {
			account_id: searcher_id,
			query: "s".to_string(),
			purpose: Purpose::Any,
			scope: ScopeMode::Own,
		})
		.await
		.expect("Search failed.");

	// exact 30 + seniority(partner) 12 + prestige 5; the lexical arm still
	// answers while both LLM-adjacent stages stand down.
	assert_eq!(response.results.len(), 1);
	assert_eq!(response.results[0].score, 47.0);
	assert!(response.results[0].match_reason.starts_with("Exact match"));
	assert_eq!(response.debug.vector_count, 0);
	assert_eq!(chat.calls.load(Ordering::SeqCst), 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
