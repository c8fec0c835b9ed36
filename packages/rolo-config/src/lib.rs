mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Limits, LlmProviderConfig, Postgres, Providers, Qdrant, Search,
	SearchExpansion, Security, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("rerank", &cfg.providers.rerank.api_key),
		("expansion", &cfg.providers.expansion.api_key),
		("summary", &cfg.providers.summary.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if cfg.search.min_query_chars == 0 {
		return Err(Error::Validation {
			message: "search.min_query_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_query_chars < cfg.search.min_query_chars {
		return Err(Error::Validation {
			message: "search.max_query_chars must be at least search.min_query_chars.".to_string(),
		});
	}
	if cfg.search.semantic_k == 0 {
		return Err(Error::Validation {
			message: "search.semantic_k must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.min_similarity.is_finite() || !(0.0..=1.0).contains(&cfg.search.min_similarity) {
		return Err(Error::Validation {
			message: "search.min_similarity must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !cfg.search.semantic_scale.is_finite() || cfg.search.semantic_scale <= 0.0 {
		return Err(Error::Validation {
			message: "search.semantic_scale must be a positive finite number.".to_string(),
		});
	}

	for (label, score) in [
		("search.exact_score", cfg.search.exact_score),
		("search.keyword_score", cfg.search.keyword_score),
		("search.purpose_boost", cfg.search.purpose_boost),
		("search.prestige_boost", cfg.search.prestige_boost),
	] {
		if !score.is_finite() || score < 0.0 {
			return Err(Error::Validation {
				message: format!("{label} must be a non-negative finite number."),
			});
		}
	}

	if cfg.search.lexical_top_n == 0 {
		return Err(Error::Validation {
			message: "search.lexical_top_n must be greater than zero.".to_string(),
		});
	}
	if cfg.search.pool_size == 0 {
		return Err(Error::Validation {
			message: "search.pool_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.expansion.max_terms == 0 {
		return Err(Error::Validation {
			message: "search.expansion.max_terms must be greater than zero.".to_string(),
		});
	}

	if cfg.limits.search_per_minute == 0 {
		return Err(Error::Validation {
			message: "limits.search_per_minute must be greater than zero.".to_string(),
		});
	}
	if cfg.limits.burst == 0 {
		return Err(Error::Validation {
			message: "limits.burst must be greater than zero.".to_string(),
		});
	}
	if cfg.limits.max_import_batch == 0 {
		return Err(Error::Validation {
			message: "limits.max_import_batch must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for api_base in [
		&mut cfg.providers.embedding.api_base,
		&mut cfg.providers.rerank.api_base,
		&mut cfg.providers.expansion.api_base,
		&mut cfg.providers.summary.api_base,
	] {
		while api_base.ends_with('/') {
			api_base.pop();
		}
	}
}
