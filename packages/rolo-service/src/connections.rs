use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{Error, Result, RoloService};
use rolo_storage::{connections, models::Connection};

const CONNECTION_COLUMNS_FOR_UPDATE: &str = "\
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
WHERE connection_id = $1
FOR UPDATE";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespondAction {
	Accept,
	Decline,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestConnectionRequest {
	pub account_id: Uuid,
	pub recipient_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestConnectionResponse {
	pub connection_id: Uuid,
	pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RespondConnectionRequest {
	pub account_id: Uuid,
	pub connection_id: Uuid,
	pub action: RespondAction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RespondConnectionResponse {
	pub connection_id: Uuid,
	pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetSharingRequest {
	pub account_id: Uuid,
	pub connection_id: Uuid,
	pub share: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetSharingResponse {
	pub connection_id: Uuid,
	pub my_sharing: bool,
	pub their_sharing: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListConnectionsRequest {
	pub account_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionItem {
	pub connection_id: Uuid,
	pub counterpart_id: Uuid,
	pub counterpart_name: String,
	pub status: String,
	pub my_sharing: bool,
	pub their_sharing: bool,
	#[serde(with = "crate::time_serde")]
	pub created_at: time::OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListConnectionsResponse {
	pub connections: Vec<ConnectionItem>,
}

impl RoloService {
	pub async fn request_connection(
		&self,
		req: RequestConnectionRequest,
	) -> Result<RequestConnectionResponse> {
		if req.account_id == req.recipient_id {
			return Err(Error::InvalidRequest {
				message: "Cannot request a connection with yourself.".to_string(),
			});
		}

		rolo_storage::accounts::get_account(&self.db.pool, req.recipient_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Recipient not found.".to_string() })?;

		// One record per unordered pair, in any status. Declined pairs stay
		// declined rather than being re-requestable.
		if connections::find_pair(&self.db.pool, req.account_id, req.recipient_id)
			.await?
			.is_some()
		{
			return Err(Error::Conflict {
				message: "A connection between these accounts already exists.".to_string(),
			});
		}

		let now = time::OffsetDateTime::now_utc();
		let connection = Connection {
			connection_id: Uuid::new_v4(),
			requester_id: req.account_id,
			recipient_id: req.recipient_id,
			status: "pending".to_string(),
			requester_shares: false,
			recipient_shares: false,
			created_at: now,
			updated_at: now,
		};

		connections::insert_connection(&self.db.pool, &connection).await?;

		Ok(RequestConnectionResponse {
			connection_id: connection.connection_id,
			status: connection.status,
		})
	}

	pub async fn respond_connection(
		&self,
		req: RespondConnectionRequest,
	) -> Result<RespondConnectionResponse> {
		let mut tx = self.db.pool.begin().await?;
		let connection = sqlx::query_as::<_, Connection>(CONNECTION_COLUMNS_FOR_UPDATE)
			.bind(req.connection_id)
			.fetch_optional(&mut *tx)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Connection not found.".to_string() })?;

		// Outsiders learn nothing about the pair.
		if connection.requester_id != req.account_id && connection.recipient_id != req.account_id {
			return Err(Error::NotFound { message: "Connection not found.".to_string() });
		}
		if connection.recipient_id != req.account_id {
			return Err(Error::InvalidRequest {
				message: "Only the recipient can respond.".to_string(),
			});
		}
		if connection.status != "pending" {
			return Err(Error::Conflict {
				message: "Connection has already been answered.".to_string(),
			});
		}

		let status = match req.action {
			RespondAction::Accept => "accepted",
			RespondAction::Decline => "declined",
		};
		let now = time::OffsetDateTime::now_utc();

		connections::update_status(&mut *tx, req.connection_id, status, now).await?;
		tx.commit().await?;

		Ok(RespondConnectionResponse {
			connection_id: req.connection_id,
			status: status.to_string(),
		})
	}

	/// Flips the caller's own outbound flag. The counterpart's flag is never
	/// touched here; sharing stays independent per side.
	pub async fn set_sharing(&self, req: SetSharingRequest) -> Result<SetSharingResponse> {
		let mut tx = self.db.pool.begin().await?;
		let connection = sqlx::query_as::<_, Connection>(CONNECTION_COLUMNS_FOR_UPDATE)
			.bind(req.connection_id)
			.fetch_optional(&mut *tx)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Connection not found.".to_string() })?;

		if connection.requester_id != req.account_id && connection.recipient_id != req.account_id {
			return Err(Error::NotFound { message: "Connection not found.".to_string() });
		}
		if connection.status != "accepted" {
			return Err(Error::Conflict {
				message: "Sharing can only be set on an accepted connection.".to_string(),
			});
		}

		let requester_side = connection.requester_id == req.account_id;
		let (requester_shares, recipient_shares) = if requester_side {
			(req.share, connection.recipient_shares)
		} else {
			(connection.requester_shares, req.share)
		};
		let now = time::OffsetDateTime::now_utc();

		connections::update_sharing(
			&mut *tx,
			req.connection_id,
			requester_shares,
			recipient_shares,
			now,
		)
		.await?;
		tx.commit().await?;

		let (my_sharing, their_sharing) = if requester_side {
			(requester_shares, recipient_shares)
		} else {
			(recipient_shares, requester_shares)
		};

		Ok(SetSharingResponse { connection_id: req.connection_id, my_sharing, their_sharing })
	}

	pub async fn list_connections(
		&self,
		req: ListConnectionsRequest,
	) -> Result<ListConnectionsResponse> {
		#[derive(FromRow)]
		struct Row {
			connection_id: Uuid,
			requester_id: Uuid,
			recipient_id: Uuid,
			status: String,
			requester_shares: bool,
			recipient_shares: bool,
			created_at: time::OffsetDateTime,
			counterpart_name: String,
		}

		let rows = sqlx::query_as::<_, Row>(
			"\
SELECT
\tc.connection_id,
\tc.requester_id,
\tc.recipient_id,
\tc.status,
\tc.requester_shares,
\tc.recipient_shares,
\tc.created_at,
\ta.display_name AS counterpart_name
FROM connections c
JOIN accounts a
\tON a.account_id = CASE WHEN c.requester_id = $1 THEN c.recipient_id ELSE c.requester_id END
WHERE c.requester_id = $1 OR c.recipient_id = $1
ORDER BY c.created_at DESC, c.connection_id ASC",
		)
		.bind(req.account_id)
		.fetch_all(&self.db.pool)
		.await?;
		let mut connections = Vec::with_capacity(rows.len());

		for row in rows {
			let requester_side = row.requester_id == req.account_id;
			let (counterpart_id, my_sharing, their_sharing) = if requester_side {
				(row.recipient_id, row.requester_shares, row.recipient_shares)
			} else {
				(row.requester_id, row.recipient_shares, row.requester_shares)
			};

			connections.push(ConnectionItem {
				connection_id: row.connection_id,
				counterpart_id,
				counterpart_name: row.counterpart_name,
				status: row.status,
				my_sharing,
				their_sharing,
				created_at: row.created_at,
			});
		}

		Ok(ListConnectionsResponse { connections })
	}
}
