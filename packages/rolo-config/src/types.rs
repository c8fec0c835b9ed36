use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub limits: Limits,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub rerank: LlmProviderConfig,
	pub expansion: LlmProviderConfig,
	pub summary: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Scoring scalars for the search pipeline. The keyword/exact/purpose/prestige
/// defaults are the product's published scoring contract; the seniority table
/// lives in `rolo-domain` because it is ordered data, not a tunable.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub min_query_chars: usize,
	pub max_query_chars: usize,
	pub semantic_k: u32,
	pub min_similarity: f32,
	pub semantic_scale: f32,
	pub exact_score: f32,
	pub keyword_score: f32,
	pub purpose_boost: f32,
	pub prestige_boost: f32,
	pub lexical_top_n: usize,
	pub pool_size: usize,
	pub expansion: SearchExpansion,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			min_query_chars: 2,
			max_query_chars: 500,
			semantic_k: 100,
			min_similarity: 0.3,
			semantic_scale: 500.0,
			exact_score: 30.0,
			keyword_score: 20.0,
			purpose_boost: 15.0,
			prestige_boost: 5.0,
			lexical_top_n: 50,
			pool_size: 50,
			expansion: SearchExpansion::default(),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchExpansion {
	pub enabled: bool,
	pub max_terms: u32,
}
impl Default for SearchExpansion {
	fn default() -> Self {
		Self { enabled: false, max_terms: 4 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Limits {
	pub search_per_minute: u32,
	pub burst: u32,
	pub max_import_batch: usize,
}
impl Default for Limits {
	fn default() -> Self {
		Self { search_per_minute: 30, burst: 10, max_import_batch: 1_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Security {
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: true }
	}
}
