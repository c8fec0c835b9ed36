mod fusion;
mod lexical;
mod rerank;

use std::collections::HashMap;

use ahash::AHashMap;
use qdrant_client::qdrant::{
	Condition, Filter, PointId, Query, QueryPointsBuilder, Value, point_id::PointIdOptions,
	value::Kind,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::{Error, Result, RoloService, ScopeMode, scope::SearchScope};
use rolo_domain::boosts::Purpose;
use rolo_storage::{contacts, models::Contact, qdrant::DENSE_VECTOR_NAME};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
	pub account_id: Uuid,
	pub query: String,
	#[serde(default)]
	pub purpose: Purpose,
	#[serde(default)]
	pub scope: ScopeMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
	Own,
	Shared,
}

/// A contact projected into one search response. `match_reason` accumulates
/// provenance across the pipeline stages until the reranker overwrites it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchCandidate {
	pub contact_id: Uuid,
	pub owner_id: Uuid,
	pub full_name: String,
	pub email: Option<String>,
	pub company: Option<String>,
	pub position: Option<String>,
	pub location: Option<String>,
	pub profile_url: Option<String>,
	pub source: CandidateSource,
	pub owner_name: String,
	pub score: f32,
	pub match_reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchDebug {
	pub vector_count: usize,
	pub keyword_count: usize,
	pub identity: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResponse {
	pub results: Vec<SearchCandidate>,
	pub debug: SearchDebug,
}

struct SemanticHit {
	contact_id: Uuid,
	owner_id: Uuid,
	similarity: f32,
	full_name: Option<String>,
	position: Option<String>,
	company: Option<String>,
}

impl RoloService {
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must not be empty.".to_string() });
		}
		if query.chars().count() > self.cfg.search.max_query_chars {
			return Err(Error::InvalidRequest {
				message: format!(
					"query must not exceed {} characters.",
					self.cfg.search.max_query_chars
				),
			});
		}

		self.limiter.acquire(req.account_id, time::OffsetDateTime::now_utc())?;

		let scope = self.resolve_scope(req.account_id, req.scope).await?;
		// The semantic arm and the relational fetch feeding the lexical arm
		// are independent; only fusion needs both.
		let (semantic_hits, rows) = tokio::join!(
			self.semantic_hits(query, &scope),
			contacts::fetch_owned_by(&self.db.pool, &scope.owner_ids)
		);
		let rows = rows?;
		let lexical =
			lexical::lexical_candidates(query, req.purpose, &rows, &scope, &self.cfg.search);
		let vector_count = semantic_hits.len();
		let keyword_count = lexical.len();
		let rows_by_id =
			rows.iter().map(|contact| (contact.contact_id, contact)).collect::<AHashMap<_, _>>();
		let semantic = semantic_hits
			.into_iter()
			.map(|hit| {
				semantic_candidate(hit, &rows_by_id, &scope, self.cfg.search.semantic_scale)
			})
			.collect::<Vec<_>>();
		let fused = fusion::fuse(semantic, lexical);
		let mut pool = fusion::dedupe(fused);

		pool.truncate(self.cfg.search.pool_size);

		let results = self.rerank_pool(query, pool).await;

		Ok(SearchResponse {
			results,
			debug: SearchDebug {
				vector_count,
				keyword_count,
				identity: scope.searcher_name.clone(),
			},
		})
	}

	/// Best-effort semantic arm. Every failure inside it degrades to an empty
	/// hit set; the request then rides on lexical retrieval alone.
	async fn semantic_hits(&self, query: &str, scope: &SearchScope) -> Vec<SemanticHit> {
		if query.chars().count() < self.cfg.search.min_query_chars {
			return Vec::new();
		}

		let embed_input = self.expanded_embed_input(query).await;

		match self.query_contact_index(&embed_input, scope).await {
			Ok(hits) => hits,
			Err(err) => {
				warn!(error = %err, "Semantic retrieval failed; serving lexical results only.");

				Vec::new()
			},
		}
	}

	/// Appends LLM-suggested related terms to the embedding input. The raw
	/// query always stays first; expansion never reaches the lexical arm.
	async fn expanded_embed_input(&self, query: &str) -> String {
		if !self.cfg.search.expansion.enabled {
			return query.to_string();
		}

		let max_terms = self.cfg.search.expansion.max_terms as usize;
		let messages = [
			json!({
				"role": "system",
				"content": format!(
					"You expand people-search queries. Respond with JSON {{\"terms\": [\"...\"]}} \
					 listing up to {max_terms} short related terms (synonyms, adjacent roles, \
					 adjacent industries). No prose."
				),
			}),
			json!({"role": "user", "content": query}),
		];

		match self.providers.chat.complete_json(&self.cfg.providers.expansion, &messages).await {
			Ok(value) => {
				let terms = value
					.get("terms")
					.and_then(serde_json::Value::as_array)
					.map(|terms| {
						terms
							.iter()
							.filter_map(serde_json::Value::as_str)
							.map(str::to_string)
							.take(max_terms)
							.collect::<Vec<_>>()
					})
					.unwrap_or_default();

				if terms.is_empty() {
					query.to_string()
				} else {
					format!("{query}\n{}", terms.join(" "))
				}
			},
			Err(err) => {
				warn!(error = %err, "Query expansion failed; embedding the raw query.");

				query.to_string()
			},
		}
	}

	async fn query_contact_index(
		&self,
		text: &str,
		scope: &SearchScope,
	) -> Result<Vec<SemanticHit>> {
		let texts = vec![text.to_string()];
		let vectors =
			self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		let owner_keys = scope.owner_ids.iter().map(Uuid::to_string).collect::<Vec<_>>();
		let filter = Filter {
			must: vec![Condition::matches("owner_id", owner_keys)],
			should: Vec::new(),
			must_not: Vec::new(),
			min_should: None,
		};
		let search = QueryPointsBuilder::new(self.index.collection.clone())
			.query(Query::new_nearest(vector))
			.using(DENSE_VECTOR_NAME)
			.filter(filter)
			.score_threshold(self.cfg.search.min_similarity)
			.with_payload(true)
			.limit(u64::from(self.cfg.search.semantic_k));
		let response = self
			.index
			.client
			.query(search)
			.await
			.map_err(|err| Error::Qdrant { message: err.to_string() })?;
		let mut hits = Vec::with_capacity(response.result.len());

		for point in response.result {
			let contact_id = point
				.id
				.as_ref()
				.and_then(point_id_to_uuid)
				.or_else(|| payload_uuid(&point.payload, "contact_id"));
			let Some(contact_id) = contact_id else {
				warn!("Semantic hit missing contact_id.");
				continue;
			};
			let Some(owner_id) = payload_uuid(&point.payload, "owner_id") else {
				warn!(contact_id = %contact_id, "Semantic hit missing owner_id.");
				continue;
			};

			hits.push(SemanticHit {
				contact_id,
				owner_id,
				similarity: point.score,
				full_name: payload_str(&point.payload, "full_name"),
				position: payload_str(&point.payload, "position"),
				company: payload_str(&point.payload, "company"),
			});
		}

		Ok(hits)
	}
}

/// Builds the candidate for one semantic hit. The stored row wins over the
/// index payload when it is still around; a stale point falls back to the
/// payload projection and fusion may backfill the rest from the lexical copy.
fn semantic_candidate(
	hit: SemanticHit,
	rows_by_id: &AHashMap<Uuid, &Contact>,
	scope: &SearchScope,
	scale: f32,
) -> SearchCandidate {
	let score = hit.similarity * scale;
	let percent = (hit.similarity * 100.0).round() as i32;
	let match_reason = format!("Semantic match ({percent}%)");
	let source = if hit.owner_id == scope.searcher_id {
		CandidateSource::Own
	} else {
		CandidateSource::Shared
	};
	let owner_name = scope.owner_name(hit.owner_id).to_string();

	match rows_by_id.get(&hit.contact_id) {
		Some(contact) => SearchCandidate {
			contact_id: hit.contact_id,
			owner_id: hit.owner_id,
			full_name: contact.full_name.clone(),
			email: contact.email.clone(),
			company: contact.company.clone(),
			position: contact.position.clone(),
			location: contact.location.clone(),
			profile_url: contact.profile_url.clone(),
			source,
			owner_name,
			score,
			match_reason,
		},
		None => SearchCandidate {
			contact_id: hit.contact_id,
			owner_id: hit.owner_id,
			full_name: hit.full_name.unwrap_or_else(|| "Unknown".to_string()),
			email: None,
			company: hit.company,
			position: hit.position,
			location: None,
			profile_url: None,
			source,
			owner_name,
			score,
			match_reason,
		},
	}
}

fn point_id_to_uuid(id: &PointId) -> Option<Uuid> {
	match &id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Uuid::parse_str(id).ok(),
		_ => None,
	}
}

fn payload_uuid(payload: &HashMap<String, Value>, key: &str) -> Option<Uuid> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Uuid::parse_str(text).ok(),
		_ => None,
	}
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) if !text.is_empty() => Some(text.clone()),
		_ => None,
	}
}
