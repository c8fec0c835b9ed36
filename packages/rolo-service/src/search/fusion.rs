//! Merges the two retrieval arms into one ranked pool, then collapses rows
//! that name the same person across owners or repeated imports.

use std::cmp::Ordering;

use ahash::AHashMap;
use uuid::Uuid;

use super::{CandidateSource, SearchCandidate};
use rolo_domain::person;

/// Additive score fusion keyed by contact id. A contact strong on both arms
/// outranks one strong on a single arm, so scores are summed rather than
/// taking the max. Lexical copies also backfill metadata the semantic
/// projection may lack.
pub(super) fn fuse(
	semantic: Vec<SearchCandidate>,
	lexical: Vec<SearchCandidate>,
) -> Vec<SearchCandidate> {
	let mut by_id =
		AHashMap::<Uuid, SearchCandidate>::with_capacity(semantic.len() + lexical.len());

	for candidate in semantic {
		by_id.insert(candidate.contact_id, candidate);
	}
	for candidate in lexical {
		match by_id.get_mut(&candidate.contact_id) {
			Some(existing) => merge_lexical(existing, candidate),
			None => {
				by_id.insert(candidate.contact_id, candidate);
			},
		}
	}

	let mut fused = by_id.into_values().collect::<Vec<_>>();

	sort_candidates(&mut fused);

	fused
}

fn merge_lexical(existing: &mut SearchCandidate, lexical: SearchCandidate) {
	existing.score += lexical.score;

	if !lexical.match_reason.is_empty() {
		if existing.match_reason.is_empty() {
			existing.match_reason = lexical.match_reason;
		} else {
			existing.match_reason.push_str("; ");
			existing.match_reason.push_str(&lexical.match_reason);
		}
	}
	if existing.email.is_none() {
		existing.email = lexical.email;
	}
	if existing.company.is_none() {
		existing.company = lexical.company;
	}
	if existing.position.is_none() {
		existing.position = lexical.position;
	}
	if existing.location.is_none() {
		existing.location = lexical.location;
	}
	if existing.profile_url.is_none() {
		existing.profile_url = lexical.profile_url;
	}
}

/// Keeps one canonical record per normalized full name. Losers are dropped
/// outright; any cross-record enrichment already happened per-id in `fuse`.
pub(super) fn dedupe(candidates: Vec<SearchCandidate>) -> Vec<SearchCandidate> {
	let mut groups = AHashMap::<String, SearchCandidate>::with_capacity(candidates.len());

	for candidate in candidates {
		let key = person::normalize_person_name(&candidate.full_name);

		match groups.get_mut(&key) {
			Some(winner) =>
				if preference(&candidate, winner).is_gt() {
					*winner = candidate;
				},
			None => {
				groups.insert(key, candidate);
			},
		}
	}

	let mut winners = groups.into_values().collect::<Vec<_>>();

	sort_candidates(&mut winners);

	winners
}

pub(super) fn sort_candidates(candidates: &mut [SearchCandidate]) {
	candidates
		.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.contact_id.cmp(&b.contact_id)));
}

/// Canonical-record order within a name group: profile URL presence, then the
/// searcher's own copy, then metadata richness, then fused score. The trailing
/// id comparison makes the order total, so the winner cannot depend on the
/// order records arrive in.
fn preference(a: &SearchCandidate, b: &SearchCandidate) -> Ordering {
	(a.profile_url.is_some().cmp(&b.profile_url.is_some()))
		.then((a.source == CandidateSource::Own).cmp(&(b.source == CandidateSource::Own)))
		.then(richness(a).cmp(&richness(b)))
		.then(a.score.total_cmp(&b.score))
		.then(b.contact_id.cmp(&a.contact_id))
}

fn richness(candidate: &SearchCandidate) -> usize {
	usize::from(candidate.company.is_some()) + usize::from(candidate.position.is_some())
}
