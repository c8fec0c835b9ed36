use sqlx::PgExecutor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, models::Account};

pub async fn upsert_account<'e, E>(
	executor: E,
	account_id: Uuid,
	display_name: &str,
	email: Option<&str>,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO accounts (account_id, display_name, email, created_at, updated_at)
VALUES ($1,$2,$3,$4,$4)
ON CONFLICT (account_id) DO UPDATE
SET
\tdisplay_name = EXCLUDED.display_name,
\temail = EXCLUDED.email,
\tupdated_at = EXCLUDED.updated_at",
	)
	.bind(account_id)
	.bind(display_name)
	.bind(email)
	.bind(now)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_account<'e, E>(executor: E, account_id: Uuid) -> Result<Option<Account>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, Account>(
		"\
SELECT
\taccount_id,
\tdisplay_name,
\temail,
\tcreated_at,
\tupdated_at
FROM accounts
WHERE account_id = $1
LIMIT 1",
	)
	.bind(account_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

/// Removes the account row. Contacts, connections and outbox entries go with
/// it through the cascading foreign keys.
pub async fn delete_account<'e, E>(executor: E, account_id: Uuid) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
		.bind(account_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected())
}
