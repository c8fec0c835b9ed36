use sqlx::PgExecutor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, models::Contact};

pub async fn upsert_contact<'e, E>(executor: E, contact: &Contact) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO contacts (
\tcontact_id,
\towner_id,
\tfull_name,
\temail,
\tcompany,
\tposition,
\tlocation,
\tprofile_url,
\tcontent_hash,
\tembedded_at,
\tcreated_at,
\tupdated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
ON CONFLICT (contact_id) DO UPDATE
SET
\tfull_name = EXCLUDED.full_name,
\temail = EXCLUDED.email,
\tcompany = EXCLUDED.company,
\tposition = EXCLUDED.position,
\tlocation = EXCLUDED.location,
\tprofile_url = EXCLUDED.profile_url,
\tcontent_hash = EXCLUDED.content_hash,
\tembedded_at = EXCLUDED.embedded_at,
\tupdated_at = EXCLUDED.updated_at",
	)
	.bind(contact.contact_id)
	.bind(contact.owner_id)
	.bind(contact.full_name.as_str())
	.bind(contact.email.as_deref())
	.bind(contact.company.as_deref())
	.bind(contact.position.as_deref())
	.bind(contact.location.as_deref())
	.bind(contact.profile_url.as_deref())
	.bind(contact.content_hash.as_str())
	.bind(contact.embedded_at)
	.bind(contact.created_at)
	.bind(contact.updated_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_contact<'e, E>(executor: E, contact_id: Uuid) -> Result<Option<Contact>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, Contact>(
		"\
SELECT
\tcontact_id,
\towner_id,
\tfull_name,
\temail,
\tcompany,
\tposition,
\tlocation,
\tprofile_url,
\tcontent_hash,
\tembedded_at,
\tcreated_at,
\tupdated_at
FROM contacts
WHERE contact_id = $1
LIMIT 1",
	)
	.bind(contact_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn find_by_profile_url<'e, E>(
	executor: E,
	owner_id: Uuid,
	profile_url: &str,
) -> Result<Option<Contact>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, Contact>(
		"\
SELECT
\tcontact_id,
\towner_id,
\tfull_name,
\temail,
\tcompany,
\tposition,
\tlocation,
\tprofile_url,
\tcontent_hash,
\tembedded_at,
\tcreated_at,
\tupdated_at
FROM contacts
WHERE owner_id = $1 AND profile_url = $2
LIMIT 1",
	)
	.bind(owner_id)
	.bind(profile_url)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

/// Every contact owned by any of `owner_ids`. The lexical scan and the
/// summary context both read from this.
pub async fn fetch_owned_by<'e, E>(executor: E, owner_ids: &[Uuid]) -> Result<Vec<Contact>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, Contact>(
		"\
SELECT
\tcontact_id,
\towner_id,
\tfull_name,
\temail,
\tcompany,
\tposition,
\tlocation,
\tprofile_url,
\tcontent_hash,
\tembedded_at,
\tcreated_at,
\tupdated_at
FROM contacts
WHERE owner_id = ANY($1)
ORDER BY contact_id ASC",
	)
	.bind(owner_ids)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn fetch_by_ids<'e, E>(executor: E, contact_ids: &[Uuid]) -> Result<Vec<Contact>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, Contact>(
		"\
SELECT
\tcontact_id,
\towner_id,
\tfull_name,
\temail,
\tcompany,
\tposition,
\tlocation,
\tprofile_url,
\tcontent_hash,
\tembedded_at,
\tcreated_at,
\tupdated_at
FROM contacts
WHERE contact_id = ANY($1)",
	)
	.bind(contact_ids)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn upsert_embedding<'e, E>(
	executor: E,
	contact_id: Uuid,
	embedding_dim: i32,
	vec_text: &str,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO contact_embeddings (contact_id, embedding_dim, vec)
VALUES ($1, $2, $3::text::vector)
ON CONFLICT (contact_id) DO UPDATE
SET
\tembedding_dim = EXCLUDED.embedding_dim,
\tvec = EXCLUDED.vec,
\tupdated_at = now()",
	)
	.bind(contact_id)
	.bind(embedding_dim)
	.bind(vec_text)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn mark_embedded<'e, E>(
	executor: E,
	contact_id: Uuid,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("UPDATE contacts SET embedded_at = $1, updated_at = $1 WHERE contact_id = $2")
		.bind(now)
		.bind(contact_id)
		.execute(executor)
		.await?;

	Ok(())
}
