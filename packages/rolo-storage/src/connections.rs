use sqlx::PgExecutor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, models::Connection};

pub async fn insert_connection<'e, E>(executor: E, connection: &Connection) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO connections (
\tconnection_id,
\trequester_id,
\trecipient_id,
\tstatus,
\trequester_shares,
\trecipient_shares,
\tcreated_at,
\tupdated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
	)
	.bind(connection.connection_id)
	.bind(connection.requester_id)
	.bind(connection.recipient_id)
	.bind(connection.status.as_str())
	.bind(connection.requester_shares)
	.bind(connection.recipient_shares)
	.bind(connection.created_at)
	.bind(connection.updated_at)
	.execute(executor)
	.await?;

	Ok(())
}

/// Looks up the connection between two accounts regardless of which side
/// requested it.
pub async fn find_pair<'e, E>(
	executor: E,
	account_a: Uuid,
	account_b: Uuid,
) -> Result<Option<Connection>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, Connection>(
		"\
SELECT
\tconnection_id,
\trequester_id,
\trecipient_id,
\tstatus,
\trequester_shares,
\trecipient_shares,
\tcreated_at,
\tupdated_at
FROM connections
WHERE LEAST(requester_id, recipient_id) = LEAST($1, $2)
\tAND GREATEST(requester_id, recipient_id) = GREATEST($1, $2)
LIMIT 1",
	)
	.bind(account_a)
	.bind(account_b)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn update_status<'e, E>(
	executor: E,
	connection_id: Uuid,
	status: &str,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("UPDATE connections SET status = $1, updated_at = $2 WHERE connection_id = $3")
		.bind(status)
		.bind(now)
		.bind(connection_id)
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn update_sharing<'e, E>(
	executor: E,
	connection_id: Uuid,
	requester_shares: bool,
	recipient_shares: bool,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
UPDATE connections
SET requester_shares = $1,
\trecipient_shares = $2,
\tupdated_at = $3
WHERE connection_id = $4",
	)
	.bind(requester_shares)
	.bind(recipient_shares)
	.bind(now)
	.bind(connection_id)
	.execute(executor)
	.await?;

	Ok(())
}

/// Accounts whose address books `account_id` may search: accepted
/// connections where the other side has sharing switched on toward the
/// caller. The caller itself is not included.
pub async fn shared_owner_ids<'e, E>(executor: E, account_id: Uuid) -> Result<Vec<Uuid>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<(Uuid,)> = sqlx::query_as(
		"\
SELECT CASE WHEN requester_id = $1 THEN recipient_id ELSE requester_id END AS owner_id
FROM connections
WHERE status = 'accepted'
\tAND ((requester_id = $1 AND recipient_shares) OR (recipient_id = $1 AND requester_shares))
ORDER BY owner_id ASC",
	)
	.bind(account_id)
	.fetch_all(executor)
	.await?;

	Ok(rows.into_iter().map(|(owner_id,)| owner_id).collect())
}
