use unicode_segmentation::UnicodeSegmentation;

/// Upper bound on keywords taken from one query. Anything past this is noise
/// for substring matching and only inflates the lexical scan.
pub const MAX_QUERY_TERMS: usize = 16;

/// Minimum keyword length. Shorter tokens ("a", "to", "vc"…) substring-match
/// almost every contact blob.
pub const MIN_TERM_CHARS: usize = 3;

const STOPWORDS: &[&str] = &[
	"about", "after", "all", "and", "any", "are", "been", "before", "being", "between", "both",
	"but", "can", "could", "did", "does", "each", "every", "find", "for", "from", "had", "has",
	"have", "her", "here", "him", "his", "how", "into", "its", "just", "know", "looking", "may",
	"might", "more", "most", "must", "need", "not", "now", "once", "only", "other", "our", "out",
	"over", "own", "people", "person", "same", "she", "should", "some", "someone", "such", "than",
	"that", "the", "their", "them", "there", "these", "they", "this", "those", "too", "under",
	"very", "want", "was", "were", "what", "when", "where", "which", "who", "whom", "why", "will",
	"with", "would", "you", "your",
];

/// Splits a free-text query into lowercase keywords for substring matching.
/// Stopwords and short tokens are dropped; order is preserved and duplicates
/// removed so "investors, investors!" scores once.
pub fn tokenize_query(query: &str) -> Vec<String> {
	let mut seen = Vec::new();

	for word in query.unicode_words() {
		let term = word.to_lowercase();

		if term.chars().count() < MIN_TERM_CHARS {
			continue;
		}
		if STOPWORDS.contains(&term.as_str()) {
			continue;
		}
		if seen.contains(&term) {
			continue;
		}

		seen.push(term);

		if seen.len() >= MAX_QUERY_TERMS {
			break;
		}
	}

	seen
}
