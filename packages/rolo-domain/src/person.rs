//! Name normalization and the text renderings derived from a contact's
//! profile fields.

use unicode_normalization::UnicodeNormalization;

/// Dedup key for a person's name: NFKC-normalized, lowercased, inner
/// whitespace collapsed to single spaces.
///
/// "Jane  DOE" and "jane doe" normalize to the same key; "Jane Doe" and
/// "Jane M. Doe" do not.
pub fn normalize_person_name(full_name: &str) -> String {
	let folded = full_name.nfkc().collect::<String>().to_lowercase();

	folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased blob of every textual profile field, used for substring and
/// keyword scans. Field order is stable so matches report consistently.
pub fn searchable_text(
	full_name: &str,
	company: Option<&str>,
	position: Option<&str>,
	email: Option<&str>,
	location: Option<&str>,
) -> String {
	let mut text = String::with_capacity(64);

	text.push_str(full_name);

	for field in [company, position, email, location].into_iter().flatten() {
		text.push(' ');
		text.push_str(field);
	}

	text.to_lowercase()
}

/// Labeled rendering of a contact fed to the embedding model. Empty fields
/// are omitted entirely rather than rendered as blank labels.
pub fn embedding_text(
	full_name: &str,
	position: Option<&str>,
	company: Option<&str>,
	location: Option<&str>,
	email: Option<&str>,
) -> String {
	let mut lines = vec![format!("Name: {full_name}")];

	for (label, field) in
		[("Position", position), ("Company", company), ("Location", location), ("Email", email)]
	{
		if let Some(value) = field.map(str::trim).filter(|value| !value.is_empty()) {
			lines.push(format!("{label}: {value}"));
		}
	}

	lines.join("\n")
}
