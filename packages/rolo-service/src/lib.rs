pub mod accounts;
pub mod connections;
pub mod contacts;
pub mod limiter;
pub mod scope;
pub mod search;
pub mod summarize;
pub mod time_serde;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;
use uuid::Uuid;

pub use accounts::{
	DeleteAccountRequest, DeleteAccountResponse, UpsertAccountRequest, UpsertAccountResponse,
};
pub use connections::{
	ConnectionItem, ListConnectionsRequest, ListConnectionsResponse, RequestConnectionRequest,
	RequestConnectionResponse, RespondAction, RespondConnectionRequest, RespondConnectionResponse,
	SetSharingRequest, SetSharingResponse,
};
pub use contacts::{
	ContactImportRow, ContactItem, ImportContactsRequest, ImportContactsResponse,
	ListContactsRequest, ListContactsResponse,
};
pub use error::{Error, Result};
pub use limiter::TokenBucketLimiter;
use rolo_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
pub use rolo_domain::boosts::Purpose;
use rolo_providers::{
	chat, embedding,
	summary::{self, SummaryStream},
};
use rolo_storage::{db::Db, qdrant::ContactIndex};
pub use scope::ScopeMode;
pub use search::{CandidateSource, SearchCandidate, SearchDebug, SearchRequest, SearchResponse};
pub use summarize::{SummarizeContact, SummarizeRequest};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete_json<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>>;
}

pub trait SummaryProvider
where
	Self: Send + Sync,
{
	fn stream<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<SummaryStream>>;
}

/// Admission control for search traffic. Runs before any retrieval work;
/// denial maps to [`Error::RateLimited`] with a retry hint.
pub trait RateLimiter
where
	Self: Send + Sync,
{
	fn acquire(&self, account_id: Uuid, now: time::OffsetDateTime) -> Result<()>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub chat: Arc<dyn ChatProvider>,
	pub summary: Arc<dyn SummaryProvider>,
}

pub struct RoloService {
	pub cfg: Config,
	pub db: Db,
	pub index: ContactIndex,
	pub providers: Providers,
	pub limiter: Arc<dyn RateLimiter>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ChatProvider for DefaultProviders {
	fn complete_json<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(chat::complete_json(cfg, messages))
	}
}

impl SummaryProvider for DefaultProviders {
	fn stream<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<SummaryStream>> {
		Box::pin(summary::stream(cfg, messages))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		chat: Arc<dyn ChatProvider>,
		summary: Arc<dyn SummaryProvider>,
	) -> Self {
		Self { embedding, chat, summary }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), chat: provider.clone(), summary: provider }
	}
}

impl RoloService {
	pub fn new(cfg: Config, db: Db, index: ContactIndex) -> Self {
		let limiter = Arc::new(TokenBucketLimiter::new(&cfg.limits));

		Self { cfg, db, index, providers: Providers::default(), limiter }
	}

	pub fn with_providers(cfg: Config, db: Db, index: ContactIndex, providers: Providers) -> Self {
		let limiter = Arc::new(TokenBucketLimiter::new(&cfg.limits));

		Self { cfg, db, index, providers, limiter }
	}

	pub fn with_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
		self.limiter = limiter;

		self
	}
}
