use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, RoloService};
use rolo_storage::{contacts, models::Contact, outbox};

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 500;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactImportRow {
	pub full_name: String,
	pub email: Option<String>,
	pub company: Option<String>,
	pub position: Option<String>,
	pub location: Option<String>,
	pub profile_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportContactsRequest {
	pub account_id: Uuid,
	pub contacts: Vec<ContactImportRow>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportContactsResponse {
	pub imported: u64,
	pub updated: u64,
	pub unchanged: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListContactsRequest {
	pub account_id: Uuid,
	pub company: Option<String>,
	pub position: Option<String>,
	pub limit: Option<i64>,
	pub offset: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactItem {
	pub contact_id: Uuid,
	pub full_name: String,
	pub email: Option<String>,
	pub company: Option<String>,
	pub position: Option<String>,
	pub location: Option<String>,
	pub profile_url: Option<String>,
	#[serde(with = "crate::time_serde::option")]
	pub embedded_at: Option<time::OffsetDateTime>,
	#[serde(with = "crate::time_serde")]
	pub created_at: time::OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: time::OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListContactsResponse {
	pub contacts: Vec<ContactItem>,
}

impl RoloService {
	/// Bulk upsert keyed on `(owner, profile_url)`. Rows without a profile
	/// URL always insert; keyed rows whose fingerprint is unchanged are
	/// skipped without touching the outbox.
	pub async fn import_contacts(
		&self,
		req: ImportContactsRequest,
	) -> Result<ImportContactsResponse> {
		if req.contacts.is_empty() {
			return Err(Error::InvalidRequest {
				message: "contacts must not be empty.".to_string(),
			});
		}
		if req.contacts.len() > self.cfg.limits.max_import_batch {
			return Err(Error::InvalidRequest {
				message: format!(
					"contacts exceeds the import batch limit of {}.",
					self.cfg.limits.max_import_batch
				),
			});
		}

		for (index, row) in req.contacts.iter().enumerate() {
			if row.full_name.trim().is_empty() {
				return Err(Error::InvalidRequest {
					message: format!("contacts[{index}].full_name must not be empty."),
				});
			}
		}

		let now = time::OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;
		let mut imported = 0_u64;
		let mut updated = 0_u64;
		let mut unchanged = 0_u64;

		for row in &req.contacts {
			let full_name = row.full_name.trim();
			let email = clean(row.email.as_deref());
			let company = clean(row.company.as_deref());
			let position = clean(row.position.as_deref());
			let location = clean(row.location.as_deref());
			let profile_url = clean(row.profile_url.as_deref());
			let content_hash = content_fingerprint(
				full_name,
				email.as_deref(),
				company.as_deref(),
				position.as_deref(),
				location.as_deref(),
				profile_url.as_deref(),
			);
			let existing = match profile_url.as_deref() {
				Some(url) => contacts::find_by_profile_url(&mut *tx, req.account_id, url).await?,
				None => None,
			};

			match existing {
				Some(current) if current.content_hash == content_hash => {
					unchanged += 1;
				},
				Some(current) => {
					let contact = Contact {
						contact_id: current.contact_id,
						owner_id: req.account_id,
						full_name: full_name.to_string(),
						email,
						company,
						position,
						location,
						profile_url,
						content_hash,
						embedded_at: None,
						created_at: current.created_at,
						updated_at: now,
					};

					contacts::upsert_contact(&mut *tx, &contact).await?;
					outbox::enqueue_embedding_job(&mut *tx, contact.contact_id, "UPSERT").await?;

					updated += 1;
				},
				None => {
					let contact = Contact {
						contact_id: Uuid::new_v4(),
						owner_id: req.account_id,
						full_name: full_name.to_string(),
						email,
						company,
						position,
						location,
						profile_url,
						content_hash,
						embedded_at: None,
						created_at: now,
						updated_at: now,
					};

					contacts::upsert_contact(&mut *tx, &contact).await?;
					outbox::enqueue_embedding_job(&mut *tx, contact.contact_id, "UPSERT").await?;

					imported += 1;
				},
			}
		}

		tx.commit().await?;

		Ok(ImportContactsResponse { imported, updated, unchanged })
	}

	pub async fn list_contacts(&self, req: ListContactsRequest) -> Result<ListContactsResponse> {
		let limit = req.limit.unwrap_or(DEFAULT_LIST_LIMIT);

		if !(1..=MAX_LIST_LIMIT).contains(&limit) {
			return Err(Error::InvalidRequest {
				message: format!("limit must be between 1 and {MAX_LIST_LIMIT}."),
			});
		}

		let offset = req.offset.unwrap_or(0);

		if offset < 0 {
			return Err(Error::InvalidRequest {
				message: "offset must not be negative.".to_string(),
			});
		}

		let mut builder = sqlx::QueryBuilder::new(
			"SELECT contact_id, owner_id, full_name, email, company, position, location, \
			 profile_url, content_hash, embedded_at, created_at, updated_at \
			 FROM contacts WHERE owner_id = ",
		);

		builder.push_bind(req.account_id);

		if let Some(company) = req.company.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
			builder.push(" AND company ILIKE ");
			builder.push_bind(format!("%{}%", escape_like(company)));
		}
		if let Some(position) = req.position.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
			builder.push(" AND position ILIKE ");
			builder.push_bind(format!("%{}%", escape_like(position)));
		}

		builder.push(" ORDER BY full_name ASC, contact_id ASC LIMIT ");
		builder.push_bind(limit);
		builder.push(" OFFSET ");
		builder.push_bind(offset);

		let rows: Vec<Contact> = builder.build_query_as().fetch_all(&self.db.pool).await?;
		let contacts = rows
			.into_iter()
			.map(|contact| ContactItem {
				contact_id: contact.contact_id,
				full_name: contact.full_name,
				email: contact.email,
				company: contact.company,
				position: contact.position,
				location: contact.location,
				profile_url: contact.profile_url,
				embedded_at: contact.embedded_at,
				created_at: contact.created_at,
				updated_at: contact.updated_at,
			})
			.collect();

		Ok(ListContactsResponse { contacts })
	}
}

fn clean(value: Option<&str>) -> Option<String> {
	value.map(str::trim).filter(|value| !value.is_empty()).map(ToString::to_string)
}

/// Change marker over every imported field. The separator byte keeps
/// ("ab", "c") and ("a", "bc") from hashing alike.
fn content_fingerprint(
	full_name: &str,
	email: Option<&str>,
	company: Option<&str>,
	position: Option<&str>,
	location: Option<&str>,
	profile_url: Option<&str>,
) -> String {
	let mut hasher = blake3::Hasher::new();

	for field in [Some(full_name), email, company, position, location, profile_url] {
		hasher.update(field.unwrap_or("").as_bytes());
		hasher.update(&[0x1f]);
	}

	hasher.finalize().to_hex().to_string()
}

fn escape_like(value: &str) -> String {
	value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
