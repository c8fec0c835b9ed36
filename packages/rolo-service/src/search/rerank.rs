//! LLM precision pass over the fused pool. Inclusion is opt-in: candidates
//! the model does not select are dropped, and an empty selection is an empty
//! result. Transport or format failures instead keep the retrieval order, so
//! the reranker can only ever narrow a pool it actually processed.

use serde_json::json;
use tracing::warn;

use super::SearchCandidate;
use crate::RoloService;

const RERANK_SYSTEM_PROMPT: &str = "You are a precise people-search assistant. From the numbered \
	 candidate list, select only the people genuinely relevant to the user's query. Respond with \
	 JSON {\"selections\": [{\"index\": <number from the list>, \"reason\": \"<short explanation \
	 for the user>\"}]} and nothing else. Order selections from most to least relevant. Select no \
	 one if no candidate truly fits.";

impl RoloService {
	pub(super) async fn rerank_pool(
		&self,
		query: &str,
		pool: Vec<SearchCandidate>,
	) -> Vec<SearchCandidate> {
		if pool.is_empty() || query.chars().count() < self.cfg.search.min_query_chars {
			return pool;
		}

		let listing = pool
			.iter()
			.enumerate()
			.map(|(index, candidate)| listing_line(index + 1, candidate))
			.collect::<Vec<_>>()
			.join("\n");
		let messages = [
			json!({"role": "system", "content": RERANK_SYSTEM_PROMPT}),
			json!({
				"role": "user",
				"content": format!("Query: {query}\n\nCandidates:\n{listing}"),
			}),
		];
		let response =
			match self.providers.chat.complete_json(&self.cfg.providers.rerank, &messages).await {
				Ok(response) => response,
				Err(err) => {
					warn!(error = %err, "Rerank call failed; keeping the retrieval order.");

					return pool;
				},
			};
		let Some(selections) = parse_selections(&response) else {
			warn!("Rerank response missed the selections shape; keeping the retrieval order.");

			return pool;
		};

		apply_selections(pool, selections)
	}
}

fn listing_line(number: usize, candidate: &SearchCandidate) -> String {
	let name = &candidate.full_name;

	match (candidate.position.as_deref(), candidate.company.as_deref()) {
		(Some(position), Some(company)) => format!("{number}. {name} - {position} at {company}"),
		(Some(position), None) => format!("{number}. {name} - {position}"),
		(None, Some(company)) => format!("{number}. {name} - {company}"),
		(None, None) => format!("{number}. {name}"),
	}
}

/// `None` when the response carries no `selections` array at all; that is the
/// malformed case the caller answers with the unreranked pool. Items inside
/// the array that lack an index or reason are skipped individually.
fn parse_selections(response: &serde_json::Value) -> Option<Vec<(u64, String)>> {
	let items = response.get("selections")?.as_array()?;
	let mut selections = Vec::with_capacity(items.len());

	for item in items {
		let index = item.get("index").and_then(serde_json::Value::as_u64);
		let reason = item.get("reason").and_then(serde_json::Value::as_str);
		let (Some(index), Some(reason)) = (index, reason) else {
			warn!("Rerank selection item missing index or reason; skipping it.");
			continue;
		};

		selections.push((index, reason.to_string()));
	}

	Some(selections)
}

/// Reorders the pool into the model's selection order. Indices are 1-based as
/// listed in the prompt; out-of-range or repeated indices are skipped.
fn apply_selections(
	pool: Vec<SearchCandidate>,
	selections: Vec<(u64, String)>,
) -> Vec<SearchCandidate> {
	let mut slots = pool.into_iter().map(Some).collect::<Vec<_>>();
	let mut results = Vec::with_capacity(selections.len());

	for (raw_index, reason) in selections {
		let index = raw_index as usize;

		if index == 0 || index > slots.len() {
			warn!(index = raw_index, "Rerank selection index out of range; skipping it.");
			continue;
		}

		let Some(mut candidate) = slots[index - 1].take() else {
			warn!(index = raw_index, "Rerank selection repeated an index; skipping it.");
			continue;
		};

		candidate.match_reason = format!("AI Match: {reason}");

		results.push(candidate);
	}

	results
}
