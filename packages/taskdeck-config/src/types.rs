use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub auth: AuthProviderConfig,
	pub object_store: ObjectStoreConfig,
	pub providers: Providers,
	#[serde(default)]
	pub upload: Upload,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	/// Dimension of the `tasks.embedding` pgvector column. Must match
	/// `providers.embedding.dimensions`.
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ObjectStoreConfig {
	pub api_base: String,
	pub api_key: String,
	pub bucket: String,
	/// Optional base URL for public object links. Falls back to
	/// `{api_base}/object/public` when unset.
	pub public_base: Option<String>,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub suggestions: SuggestionProviderConfig,
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
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_suggestions: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Upload {
	pub max_bytes: u64,
}
impl Default for Upload {
	fn default() -> Self {
		Self { max_bytes: 5 * 1024 * 1024 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub top_k: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { top_k: 20 }
	}
}
