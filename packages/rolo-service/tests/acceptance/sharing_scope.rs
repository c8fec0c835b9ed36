use std::sync::Arc;

use super::{FailingChat, StubEmbedding, StubSummary, TEST_VECTOR_DIM};
use rolo_service::{
	CandidateSource, ImportContactsRequest, Providers, Purpose, RequestConnectionRequest,
	RespondAction, RespondConnectionRequest, RoloService, ScopeMode, SearchRequest,
	SetSharingRequest,
};

async fn search_names(
	service: &RoloService,
	account_id: uuid::Uuid,
	scope: ScopeMode,
) -> Vec<String> {
	let response = service
		.search(SearchRequest {
			account_id,
			query: "partner".to_string(),
			purpose: Purpose::Any,
			scope,
		})
		.await
		.expect("Search failed.");

	response.results.into_iter().map(|candidate| candidate.full_name).collect()
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn sharing_is_directional_and_scope_bounded() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping sharing_is_directional_and_scope_bounded; set ROLO_PG_DSN to run this test."
		);

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!("Skipping sharing_is_directional_and_scope_bounded; set ROLO_QDRANT_URL to run this test.");

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
	let alice_id = super::create_account(&service, "Alice").await;
	let bruno_id = super::create_account(&service, "Bruno").await;

	service
		.import_contacts(ImportContactsRequest {
			account_id: alice_id,
			contacts: vec![super::import_row("Casey Park", Some("Partner"), None, None)],
		})
		.await
		.expect("Failed to import Alice's contacts.");
	service
		.import_contacts(ImportContactsRequest {
			account_id: bruno_id,
			contacts: vec![super::import_row("Dana Reed", Some("Partner"), None, None)],
		})
		.await
		.expect("Failed to import Bruno's contacts.");

	let connection = service
		.request_connection(RequestConnectionRequest {
			account_id: alice_id,
			recipient_id: bruno_id,
		})
		.await
		.expect("Failed to request connection.");

	service
		.respond_connection(RespondConnectionRequest {
			account_id: bruno_id,
			connection_id: connection.connection_id,
			action: RespondAction::Accept,
		})
		.await
		.expect("Failed to accept connection.");

	// Bruno opens his side only. Alice keeps hers closed.
	service
		.set_sharing(SetSharingRequest {
			account_id: bruno_id,
			connection_id: connection.connection_id,
			share: true,
		})
		.await
		.expect("Failed to enable sharing.");

	let alice_extended = search_names(&service, alice_id, ScopeMode::Extended).await;

	assert!(alice_extended.contains(&"Casey Park".to_string()));
	assert!(alice_extended.contains(&"Dana Reed".to_string()));

	let bruno_extended = search_names(&service, bruno_id, ScopeMode::Extended).await;

	assert!(bruno_extended.contains(&"Dana Reed".to_string()));
	assert!(!bruno_extended.contains(&"Casey Park".to_string()));

	let alice_own = search_names(&service, alice_id, ScopeMode::Own).await;

	assert_eq!(alice_own, vec!["Casey Park".to_string()]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set ROLO_PG_DSN and ROLO_QDRANT_URL to run."]
async fn duplicate_names_collapse_to_the_richer_record() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping duplicate_names_collapse_to_the_richer_record; set ROLO_PG_DSN to run this test."
		);

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!(
			"Skipping duplicate_names_collapse_to_the_richer_record; set ROLO_QDRANT_URL to run this test."
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
	let alice_id = super::create_account(&service, "Alice").await;
	let bruno_id = super::create_account(&service, "Bruno").await;

	service
		.import_contacts(ImportContactsRequest {
			account_id: alice_id,
			contacts: vec![super::import_row("John Smith", Some("Partner"), None, None)],
		})
		.await
		.expect("Failed to import Alice's contacts.");
	service
		.import_contacts(ImportContactsRequest {
			account_id: bruno_id,
			contacts: vec![super::import_row(
				"John Smith",
				Some("Partner"),
				Some("Stripe"),
				Some("https://linkedin.com/in/johnsmith"),
			)],
		})
		.await
		.expect("Failed to import Bruno's contacts.");

	let connection = service
		.request_connection(RequestConnectionRequest {
			account_id: alice_id,
			recipient_id: bruno_id,
		})
		.await
		.expect("Failed to request connection.");

	service
		.respond_connection(RespondConnectionRequest {
			account_id: bruno_id,
			connection_id: connection.connection_id,
			action: RespondAction::Accept,
		})
		.await
		.expect("Failed to accept connection.");
	service
		.set_sharing(SetSharingRequest {
			account_id: bruno_id,
			connection_id: connection.connection_id,
			share: true,
		})
		.await
		.expect("Failed to enable sharing.");

	let response = service
		.search(SearchRequest {
			account_id: alice_id,
			query: "partner".to_string(),
			purpose: Purpose::Any,
			scope: ScopeMode::Extended,
		})
		.await
		.expect("Search failed.");

	// One John Smith survives, and it is the shared record with the profile
	// URL rather than Alice's bare own copy.
	assert_eq!(response.results.len(), 1);
	assert_eq!(response.results[0].full_name, "John Smith");
	assert_eq!(response.results[0].source, CandidateSource::Shared);
	assert_eq!(response.results[0].owner_name, "Bruno");
	assert!(response.results[0].profile_url.is_some());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
