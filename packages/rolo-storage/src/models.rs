use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct Account {
	pub account_id: Uuid,
	pub display_name: String,
	pub email: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Contact {
	pub contact_id: Uuid,
	pub owner_id: Uuid,
	pub full_name: String,
	pub email: Option<String>,
	pub company: Option<String>,
	pub position: Option<String>,
	pub location: Option<String>,
	pub profile_url: Option<String>,
	pub content_hash: String,
	pub embedded_at: Option<OffsetDateTime>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Connection {
	pub connection_id: Uuid,
	pub requester_id: Uuid,
	pub recipient_id: Uuid,
	pub status: String,
	pub requester_shares: bool,
	pub recipient_shares: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct EmbeddingOutboxEntry {
	pub outbox_id: Uuid,
	pub contact_id: Uuid,
	pub op: String,
	pub status: String,
	pub attempts: i32,
	pub last_error: Option<String>,
	pub available_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
