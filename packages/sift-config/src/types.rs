use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub security: Security,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub hybrid: Hybrid,
	pub providers: Providers,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Origins allowed by CORS. Empty means any origin.
	#[serde(default)]
	pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Security {
	/// Bearer token inbound callers must present. `None` disables inbound auth.
	pub api_auth_token: Option<String>,
	/// Echo collaborator error bodies back to callers.
	#[serde(default)]
	pub expose_upstream_detail: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Search {
	#[serde(default)]
	pub content_type_mode: ContentTypeMode,
	#[serde(default)]
	pub recency_strategy: RecencyStrategy,
	#[serde(default = "default_top_k")]
	pub default_top_k: u32,
	#[serde(default = "default_max_top_k")]
	pub max_top_k: u32,
	#[serde(default = "default_max_recency_days")]
	pub max_recency_days: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			content_type_mode: ContentTypeMode::default(),
			recency_strategy: RecencyStrategy::default(),
			default_top_k: default_top_k(),
			max_top_k: default_max_top_k(),
			max_recency_days: default_max_recency_days(),
		}
	}
}

/// How the `type` query parameter is interpreted.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentTypeMode {
	/// Comma or slash separated tokens such as `podcast,video`.
	#[default]
	Tokens,
	/// One of the closed-set facet labels such as `Essays Only`.
	Labels,
}

/// How a `days` window is turned into a metadata predicate.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecencyStrategy {
	/// `date $gte <cutoff>`; requires ISO dates in the index.
	#[default]
	Gte,
	/// `Date $in <every rendering of every day>`; tolerates mixed date formats.
	Enumerate,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Hybrid {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default = "default_alpha")]
	pub default_alpha: f32,
}
impl Default for Hybrid {
	fn default() -> Self {
		Self { enabled: false, default_alpha: default_alpha() }
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub sparse: Option<SparseProviderConfig>,
	pub index: IndexProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub path: String,
	pub api_key: Option<String>,
	pub model: String,
	/// Expected vector length. Responses of another length are rejected.
	pub dimensions: Option<u32>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SparseProviderConfig {
	pub api_base: String,
	pub path: String,
	/// Falls back to `providers.index.api_key` when unset.
	pub api_key: Option<String>,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IndexProviderConfig {
	pub api_base: Option<String>,
	#[serde(default = "default_index_path")]
	pub path: String,
	pub api_key: Option<String>,
	pub namespace: Option<String>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_top_k() -> u32 {
	10
}

fn default_max_top_k() -> u32 {
	50
}

fn default_max_recency_days() -> u32 {
	365
}

fn default_alpha() -> f32 {
	0.8
}

fn default_index_path() -> String {
	"/query".to_string()
}
