mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, ContentTypeMode, EmbeddingProviderConfig, Hybrid, IndexProviderConfig, Providers,
	RecencyStrategy, Search, Security, Service, SparseProviderConfig,
};

use std::{env, fs, net::SocketAddr, path::Path};

use serde_json::{Map, Value};

pub const ENV_EMBEDDING_API_KEY: &str = "SIFT_EMBEDDING_API_KEY";
pub const ENV_INDEX_API_KEY: &str = "SIFT_INDEX_API_KEY";
pub const ENV_INDEX_HOST: &str = "SIFT_INDEX_HOST";
pub const ENV_INDEX_NAMESPACE: &str = "SIFT_INDEX_NAMESPACE";
pub const ENV_API_AUTH_TOKEN: &str = "SIFT_API_AUTH_TOKEN";
pub const ENV_HYBRID_ENABLED: &str = "SIFT_HYBRID_ENABLED";
pub const ENV_EXPOSE_UPSTREAM_DETAIL: &str = "SIFT_EXPOSE_UPSTREAM_DETAIL";

pub fn load(path: &Path) -> Result<Config> {
	load_with_env(path, |key| env::var(key).ok())
}

/// Loads a config file, overlaying values from `lookup` instead of the process environment.
pub fn load_with_env<F>(path: &Path, lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_env(&mut cfg, lookup)?;
	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn apply_env<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(value) = lookup(ENV_EMBEDDING_API_KEY) {
		cfg.providers.embedding.api_key = Some(value);
	}
	if let Some(value) = lookup(ENV_INDEX_API_KEY) {
		cfg.providers.index.api_key = Some(value);
	}
	if let Some(value) = lookup(ENV_INDEX_HOST) {
		cfg.providers.index.api_base = Some(value);
	}
	if let Some(value) = lookup(ENV_INDEX_NAMESPACE) {
		cfg.providers.index.namespace = Some(value);
	}
	if let Some(value) = lookup(ENV_API_AUTH_TOKEN) {
		cfg.security.api_auth_token = Some(value);
	}
	if let Some(value) = lookup(ENV_HYBRID_ENABLED) {
		cfg.hybrid.enabled = parse_env_bool(ENV_HYBRID_ENABLED, &value)?;
	}
	if let Some(value) = lookup(ENV_EXPOSE_UPSTREAM_DETAIL) {
		cfg.security.expose_upstream_detail = parse_env_bool(ENV_EXPOSE_UPSTREAM_DETAIL, &value)?;
	}

	Ok(())
}

pub fn normalize(cfg: &mut Config) {
	let providers = &mut cfg.providers;

	providers.embedding.api_base = trim_base(&providers.embedding.api_base);
	providers.embedding.api_key = non_blank(providers.embedding.api_key.take());
	providers.index.api_base =
		non_blank(providers.index.api_base.take()).map(|base| trim_base(&base));
	providers.index.api_key = non_blank(providers.index.api_key.take());
	providers.index.namespace = non_blank(providers.index.namespace.take());

	if let Some(sparse) = providers.sparse.as_mut() {
		sparse.api_base = trim_base(&sparse.api_base);
		sparse.api_key =
			non_blank(sparse.api_key.take()).or_else(|| providers.index.api_key.clone());
	}

	cfg.security.api_auth_token = non_blank(cfg.security.api_auth_token.take());
	cfg.service.cors_allowed_origins.retain(|origin| !origin.trim().is_empty());
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: "service.http_bind must be a valid socket address.".to_string(),
		});
	}
	if cfg.search.default_top_k == 0 {
		return Err(Error::Validation {
			message: "search.default_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_top_k == 0 {
		return Err(Error::Validation {
			message: "search.max_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_recency_days == 0 {
		return Err(Error::Validation {
			message: "search.max_recency_days must be greater than zero.".to_string(),
		});
	}
	if !cfg.hybrid.default_alpha.is_finite() {
		return Err(Error::Validation {
			message: "hybrid.default_alpha must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.hybrid.default_alpha) {
		return Err(Error::Validation {
			message: "hybrid.default_alpha must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.hybrid.enabled && cfg.providers.sparse.is_none() {
		return Err(Error::Validation {
			message: "providers.sparse is required when hybrid.enabled is true.".to_string(),
		});
	}

	let embedding = &cfg.providers.embedding;

	validate_provider(
		"embedding",
		&embedding.path,
		embedding.timeout_ms,
		&embedding.default_headers,
	)?;

	if embedding.dimensions == Some(0) {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if embedding.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.model must be non-empty.".to_string(),
		});
	}

	if let Some(sparse) = cfg.providers.sparse.as_ref() {
		validate_provider("sparse", &sparse.path, sparse.timeout_ms, &sparse.default_headers)?;

		if sparse.model.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.sparse.model must be non-empty.".to_string(),
			});
		}
	}

	let index = &cfg.providers.index;

	validate_provider("index", &index.path, index.timeout_ms, &index.default_headers)?;

	Ok(())
}

fn validate_provider(
	label: &str,
	path: &str,
	timeout_ms: u64,
	default_headers: &Map<String, Value>,
) -> Result<()> {
	if !path.starts_with('/') {
		return Err(Error::Validation {
			message: format!("providers.{label}.path must start with '/'."),
		});
	}
	if timeout_ms == 0 {
		return Err(Error::Validation {
			message: format!("providers.{label}.timeout_ms must be greater than zero."),
		});
	}
	if default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: format!("providers.{label}.default_headers values must be strings."),
		});
	}

	Ok(())
}

fn parse_env_bool(key: &str, raw: &str) -> Result<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" | "" => Ok(false),
		other => Err(Error::InvalidEnv {
			key: key.to_string(),
			message: format!("expected a boolean, got '{other}'."),
		}),
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty())
}

fn trim_base(raw: &str) -> String {
	raw.trim().trim_end_matches('/').to_string()
}
