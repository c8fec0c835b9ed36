use std::{collections::HashMap, time::Duration as StdDuration};

use color_eyre::{Result, eyre};
use qdrant_client::{
	client::Payload,
	qdrant::{PointStruct, UpsertPointsBuilder, Value, Vector},
};
use time::{Duration, OffsetDateTime};
use tokio::time as tokio_time;

use rolo_domain::person;
use rolo_providers::embedding;
use rolo_storage::{
	contacts,
	db::Db,
	models::{Contact, EmbeddingOutboxEntry},
	outbox,
	qdrant::{ContactIndex, DENSE_VECTOR_NAME},
};

const POLL_INTERVAL_MS: i64 = 500;
const CLAIM_LEASE_SECONDS: i64 = 30;
const BASE_BACKOFF_MS: i64 = 2_000;
const MAX_BACKOFF_MS: i64 = 300_000;
const MAX_OUTBOX_ERROR_CHARS: usize = 1_024;
const REDACTED: &str = "[REDACTED]";
const SECRET_KEYS: [&str; 5] = ["api_key", "apikey", "password", "secret", "token"];

pub struct WorkerState {
	pub db: Db,
	pub index: ContactIndex,
	pub embedding: rolo_config::EmbeddingProviderConfig,
}

pub async fn run_worker(state: WorkerState) -> Result<()> {
	loop {
		if let Err(err) = process_outbox_once(&state).await {
			tracing::error!(error = %err, "Embedding outbox processing failed.");
		}

		tokio_time::sleep(to_std_duration(Duration::milliseconds(POLL_INTERVAL_MS))).await;
	}
}

async fn process_outbox_once(state: &WorkerState) -> Result<()> {
	let now = OffsetDateTime::now_utc();
	let job = outbox::claim_next_embedding_job(&state.db, now, CLAIM_LEASE_SECONDS).await?;
	let Some(job) = job else {
		return Ok(());
	};
	let result = match job.op.as_str() {
		"UPSERT" => handle_upsert(state, &job).await,
		other => Err(eyre::eyre!("Unsupported outbox op: {other}.")),
	};

	match result {
		Ok(()) => {
			outbox::mark_embedding_job_done(&state.db, job.outbox_id, OffsetDateTime::now_utc())
				.await?;
		},
		Err(err) => {
			mark_failed(&state.db, &job, &err).await?;
			tracing::error!(error = %err, outbox_id = %job.outbox_id, "Outbox job failed.");
		},
	}

	Ok(())
}

async fn handle_upsert(state: &WorkerState, job: &EmbeddingOutboxEntry) -> Result<()> {
	let contact = contacts::get_contact(&state.db.pool, job.contact_id).await?;
	let Some(contact) = contact else {
		tracing::info!(contact_id = %job.contact_id, "Contact missing for outbox job. Marking done.");

		return Ok(());
	};
	let text = person::embedding_text(
		&contact.full_name,
		contact.position.as_deref(),
		contact.company.as_deref(),
		contact.location.as_deref(),
		contact.email.as_deref(),
	);
	let vectors = embedding::embed(&state.embedding, &[text]).await?;
	let Some(vector) = vectors.into_iter().next() else {
		return Err(eyre::eyre!("Embedding provider returned no vectors."));
	};

	validate_vector_dim(&vector, state.index.vector_dim)?;

	{
		let mut tx = state.db.pool.begin().await?;
		let vec_text = format_vector_text(&vector);

		contacts::upsert_embedding(&mut *tx, contact.contact_id, vector.len() as i32, &vec_text)
			.await?;
		contacts::mark_embedded(&mut *tx, contact.contact_id, OffsetDateTime::now_utc()).await?;
		tx.commit().await?;
	}

	upsert_contact_point(state, &contact, &vector).await?;

	Ok(())
}

async fn upsert_contact_point(
	state: &WorkerState,
	contact: &Contact,
	vector: &[f32],
) -> Result<()> {
	let mut payload_map = HashMap::new();

	payload_map.insert("contact_id".to_string(), Value::from(contact.contact_id.to_string()));
	payload_map.insert("owner_id".to_string(), Value::from(contact.owner_id.to_string()));
	payload_map.insert("full_name".to_string(), Value::from(contact.full_name.clone()));

	// Absent fields are omitted rather than written as nulls; the read side
	// treats a missing key and a null the same way.
	if let Some(position) = &contact.position {
		payload_map.insert("position".to_string(), Value::from(position.clone()));
	}
	if let Some(company) = &contact.company {
		payload_map.insert("company".to_string(), Value::from(company.clone()));
	}

	let payload = Payload::from(payload_map);
	let mut vector_map = HashMap::new();

	vector_map.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(vector.to_vec()));

	let point = PointStruct::new(contact.contact_id.to_string(), vector_map, payload);
	let upsert = UpsertPointsBuilder::new(state.index.collection.clone(), vec![point]).wait(true);

	state.index.client.upsert_points(upsert).await?;

	Ok(())
}

async fn mark_failed(db: &Db, job: &EmbeddingOutboxEntry, err: &color_eyre::Report) -> Result<()> {
	let next_attempts = job.attempts.saturating_add(1);
	let backoff = backoff_for_attempt(next_attempts);
	let now = OffsetDateTime::now_utc();
	let error_text = sanitize_outbox_error(&err.to_string());

	outbox::mark_embedding_job_failed(
		db,
		job.outbox_id,
		next_attempts,
		&error_text,
		now + backoff,
		now,
	)
	.await?;

	Ok(())
}

fn validate_vector_dim(vec: &[f32], expected_dim: u32) -> Result<()> {
	if vec.len() != expected_dim as usize {
		return Err(eyre::eyre!(
			"Embedding dimension {} does not match configured vector_dim {}.",
			vec.len(),
			expected_dim
		));
	}

	Ok(())
}

fn format_vector_text(vec: &[f32]) -> String {
	let mut out = String::from("[");

	for (idx, value) in vec.iter().enumerate() {
		if idx > 0 {
			out.push(',');
		}
		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

fn sanitize_outbox_error(text: &str) -> String {
	let mut words = Vec::new();
	let mut redact_next = false;

	for raw in text.split_whitespace() {
		if redact_next {
			words.push(REDACTED.to_string());
			redact_next = false;

			continue;
		}
		if raw.eq_ignore_ascii_case("bearer") {
			redact_next = true;
			words.push(raw.to_string());

			continue;
		}

		let lowered = raw.to_ascii_lowercase();
		let secretish = SECRET_KEYS
			.iter()
			.any(|key| lowered.contains(key) && (lowered.contains('=') || lowered.contains(':')));

		if secretish {
			let sep = if raw.contains('=') { '=' } else { ':' };
			let prefix = raw.split(sep).next().unwrap_or(raw);

			words.push(format!("{prefix}{sep}{REDACTED}"));
		} else {
			words.push(raw.to_string());
		}
	}

	let mut out = words.join(" ");

	if out.chars().count() > MAX_OUTBOX_ERROR_CHARS {
		out = out.chars().take(MAX_OUTBOX_ERROR_CHARS).collect();
		out.push_str("...");
	}

	out
}

fn backoff_for_attempt(attempt: i32) -> Duration {
	let attempts = attempt.max(1) as u32;
	let exp = attempts.saturating_sub(1).min(8);
	let base = BASE_BACKOFF_MS.saturating_mul(1 << exp);

	Duration::milliseconds(base.min(MAX_BACKOFF_MS))
}

fn to_std_duration(duration: Duration) -> StdDuration {
	let millis = duration.whole_milliseconds();

	if millis <= 0 {
		return StdDuration::from_millis(0);
	}

	StdDuration::from_millis(millis as u64)
}
