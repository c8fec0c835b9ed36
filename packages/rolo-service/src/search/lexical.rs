//! Keyword retrieval over the full in-scope contact set. Unlike the semantic
//! arm this inspects every row, so its input is bounded by scope size rather
//! than an index cut-off.

use rolo_config::Search;
use rolo_domain::{
	boosts::{self, Purpose, PurposeAffinity},
	person, query,
};
use rolo_storage::models::Contact;

use super::{CandidateSource, SearchCandidate};
use crate::scope::SearchScope;

pub(super) fn lexical_candidates(
	query_text: &str,
	purpose: Purpose,
	rows: &[Contact],
	scope: &SearchScope,
	cfg: &Search,
) -> Vec<SearchCandidate> {
	let query_lower = query_text.trim().to_lowercase();
	let affinity = boosts::purpose_affinity(purpose);
	let terms = term_pool(&query_lower, affinity.as_ref());
	let mut candidates = Vec::new();

	for contact in rows {
		let Some((score, match_reason)) =
			score_contact(contact, &query_lower, &terms, affinity.as_ref(), cfg)
		else {
			continue;
		};
		let source = if contact.owner_id == scope.searcher_id {
			CandidateSource::Own
		} else {
			CandidateSource::Shared
		};

		candidates.push(SearchCandidate {
			contact_id: contact.contact_id,
			owner_id: contact.owner_id,
			full_name: contact.full_name.clone(),
			email: contact.email.clone(),
			company: contact.company.clone(),
			position: contact.position.clone(),
			location: contact.location.clone(),
			profile_url: contact.profile_url.clone(),
			source,
			owner_name: scope.owner_name(contact.owner_id).to_string(),
			score,
			match_reason,
		});
	}

	candidates
		.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.contact_id.cmp(&b.contact_id)));
	candidates.truncate(cfg.lexical_top_n);

	candidates
}

/// Query keywords first, then the purpose's affinity keywords. Affinity terms
/// widen recall so a "raise funds" search surfaces partners and funds even
/// when the query itself never names them.
fn term_pool(query_lower: &str, affinity: Option<&PurposeAffinity>) -> Vec<String> {
	let mut terms = query::tokenize_query(query_lower);

	if let Some(affinity) = affinity {
		for keyword in affinity.position_keywords.iter().chain(affinity.company_keywords) {
			if !terms.iter().any(|term| term == keyword) {
				terms.push((*keyword).to_string());
			}
		}
	}

	terms
}

/// Scores one contact against the query. `None` means the contact earned
/// nothing and stays out of the candidate set entirely.
fn score_contact(
	contact: &Contact,
	query_lower: &str,
	terms: &[String],
	affinity: Option<&PurposeAffinity>,
	cfg: &Search,
) -> Option<(f32, String)> {
	let blob = person::searchable_text(
		&contact.full_name,
		contact.company.as_deref(),
		contact.position.as_deref(),
		contact.email.as_deref(),
		contact.location.as_deref(),
	);
	let position = contact.position.as_deref().unwrap_or_default().to_lowercase();
	let company = contact.company.as_deref().unwrap_or_default().to_lowercase();
	let mut score = 0.0;
	let mut reasons = Vec::new();

	// Tiered text match: the whole query as a phrase outranks any single term.
	if !query_lower.is_empty() && blob.contains(query_lower) {
		score += cfg.exact_score;
		reasons.push("Exact match".to_string());
	} else if let Some(term) = terms.iter().find(|term| blob.contains(term.as_str())) {
		score += cfg.keyword_score;
		reasons.push(format!("Matches term: {term}"));
	}

	if let Some(affinity) = affinity {
		let position_hit = affinity.position_keywords.iter().any(|kw| position.contains(kw));
		let company_hit = affinity.company_keywords.iter().any(|kw| company.contains(kw));

		if position_hit || company_hit {
			score += cfg.purpose_boost;
			reasons.push("Purpose fit".to_string());
		}
	}
	if let Some((title, weight)) = boosts::seniority_match(&position) {
		score += weight;
		reasons.push(format!("Seniority: {title}"));
	}
	if boosts::is_prestige_company(&company) {
		score += cfg.prestige_boost;
		reasons.push("Notable company".to_string());
	}

	if score <= 0.0 {
		return None;
	}

	Some((score, reasons.join("; ")))
}
