use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, RoloService};
use rolo_providers::summary::SummaryStream;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummarizeContact {
	pub full_name: String,
	pub position: Option<String>,
	pub company: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummarizeRequest {
	pub account_id: Uuid,
	pub query: String,
	pub contacts: Vec<SummarizeContact>,
}

impl RoloService {
	/// Streams a short digest over a finished result list. The prompt pins the
	/// model to the contacts the caller provides; it is a presentation layer
	/// over search output, not another retrieval stage.
	pub async fn summarize_results(&self, req: SummarizeRequest) -> Result<SummaryStream> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must not be empty.".to_string() });
		}
		if query.chars().count() > self.cfg.search.max_query_chars {
			return Err(Error::InvalidRequest {
				message: format!(
					"query must not exceed {} characters.",
					self.cfg.search.max_query_chars
				),
			});
		}
		if req.contacts.is_empty() {
			return Err(Error::InvalidRequest {
				message: "contacts must not be empty.".to_string(),
			});
		}
		if req.contacts.len() > self.cfg.search.pool_size {
			return Err(Error::InvalidRequest {
				message: format!(
					"contacts must not exceed {} entries.",
					self.cfg.search.pool_size
				),
			});
		}

		self.limiter.acquire(req.account_id, OffsetDateTime::now_utc())?;

		let listing =
			req.contacts.iter().map(contact_line).collect::<Vec<_>>().join("\n");
		let messages = [
			json!({
				"role": "system",
				"content": "You summarize people-search results. Using only the contacts the \
					 user lists, write two or three sentences on who they should reach out to \
					 for their query and why. Never mention anyone absent from the list. No \
					 preamble.",
			}),
			json!({
				"role": "user",
				"content": format!("Query: {query}\n\nContacts:\n{listing}"),
			}),
		];
		let stream =
			self.providers.summary.stream(&self.cfg.providers.summary, &messages).await?;

		Ok(stream)
	}
}

fn contact_line(contact: &SummarizeContact) -> String {
	let name = &contact.full_name;

	match (contact.position.as_deref(), contact.company.as_deref()) {
		(Some(position), Some(company)) => format!("- {name} ({position} at {company})"),
		(Some(position), None) => format!("- {name} ({position})"),
		(None, Some(company)) => format!("- {name} ({company})"),
		(None, None) => format!("- {name}"),
	}
}
