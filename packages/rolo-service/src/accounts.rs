use qdrant_client::qdrant::{Condition, DeletePointsBuilder, Filter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, RoloService};
use rolo_storage::accounts;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpsertAccountRequest {
	pub account_id: Uuid,
	pub display_name: String,
	pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpsertAccountResponse {
	pub account_id: Uuid,
	pub display_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteAccountRequest {
	pub account_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
	pub deleted: bool,
}

impl RoloService {
	pub async fn upsert_account(&self, req: UpsertAccountRequest) -> Result<UpsertAccountResponse> {
		let display_name = req.display_name.trim();

		if display_name.is_empty() {
			return Err(Error::InvalidRequest {
				message: "display_name must not be empty.".to_string(),
			});
		}

		let email = req.email.as_deref().map(str::trim).filter(|email| !email.is_empty());
		let now = time::OffsetDateTime::now_utc();

		accounts::upsert_account(&self.db.pool, req.account_id, display_name, email, now).await?;

		Ok(UpsertAccountResponse {
			account_id: req.account_id,
			display_name: display_name.to_string(),
		})
	}

	/// The only hard-delete path for contacts. Vector points are purged
	/// before the rows so a retry after a partial failure still finds the
	/// account; the row delete cascades to contacts, connections and
	/// outbox entries.
	pub async fn delete_account(&self, req: DeleteAccountRequest) -> Result<DeleteAccountResponse> {
		let filter = Filter::must([Condition::matches("owner_id", req.account_id.to_string())]);
		let delete =
			DeletePointsBuilder::new(self.index.collection.clone()).points(filter).wait(true);

		self.index
			.client
			.delete_points(delete)
			.await
			.map_err(|err| Error::Qdrant { message: err.to_string() })?;

		let deleted = accounts::delete_account(&self.db.pool, req.account_id).await?;

		if deleted == 0 {
			return Err(Error::NotFound { message: "Account not found.".to_string() });
		}

		Ok(DeleteAccountResponse { deleted: true })
	}
}
