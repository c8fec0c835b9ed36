//! Resolution of which address books one search may read.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{Error, Result, RoloService};
use rolo_storage::connections;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
	Own,
	#[default]
	Extended,
}

/// Owner accounts one search may read, resolved once per request. The
/// searcher is always a member; extended scope adds every accepted
/// connection whose other side shares toward the searcher.
#[derive(Debug)]
pub struct SearchScope {
	pub searcher_id: Uuid,
	pub searcher_name: String,
	pub owner_ids: Vec<Uuid>,
	pub owner_names: AHashMap<Uuid, String>,
}

impl SearchScope {
	pub fn owner_name(&self, owner_id: Uuid) -> &str {
		self.owner_names.get(&owner_id).map(String::as_str).unwrap_or("Unknown")
	}
}

impl RoloService {
	pub(crate) async fn resolve_scope(
		&self,
		searcher_id: Uuid,
		mode: ScopeMode,
	) -> Result<SearchScope> {
		let account = rolo_storage::accounts::get_account(&self.db.pool, searcher_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Account not found.".to_string() })?;
		let mut owner_ids = vec![searcher_id];

		if mode == ScopeMode::Extended {
			owner_ids.extend(connections::shared_owner_ids(&self.db.pool, searcher_id).await?);
		}

		#[derive(FromRow)]
		struct Row {
			account_id: Uuid,
			display_name: String,
		}

		let rows = sqlx::query_as::<_, Row>(
			"SELECT account_id, display_name FROM accounts WHERE account_id = ANY($1)",
		)
		.bind(owner_ids.as_slice())
		.fetch_all(&self.db.pool)
		.await?;
		let owner_names = rows
			.into_iter()
			.map(|row| (row.account_id, row.display_name))
			.collect::<AHashMap<_, _>>();

		Ok(SearchScope {
			searcher_id,
			searcher_name: account.display_name,
			owner_ids,
			owner_names,
		})
	}
}
