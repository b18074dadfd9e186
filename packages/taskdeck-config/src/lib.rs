mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AuthProviderConfig, Config, EmbeddingProviderConfig, ObjectStoreConfig, Postgres, Providers,
	Search, Service, Storage, SuggestionProviderConfig, Upload,
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
	if cfg.providers.embedding.dimensions != cfg.storage.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.vector_dim.".to_string(),
		});
	}
	if cfg.providers.suggestions.max_suggestions == 0 {
		return Err(Error::Validation {
			message: "providers.suggestions.max_suggestions must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.suggestions.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.suggestions.temperature must be a finite number.".to_string(),
		});
	}
	if cfg.upload.max_bytes == 0 {
		return Err(Error::Validation {
			message: "upload.max_bytes must be greater than zero.".to_string(),
		});
	}
	if cfg.search.top_k == 0 {
		return Err(Error::Validation {
			message: "search.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.object_store.bucket.trim().is_empty() {
		return Err(Error::Validation {
			message: "object_store.bucket must be non-empty.".to_string(),
		});
	}

	for (label, key) in [
		("auth", &cfg.auth.api_key),
		("object_store", &cfg.object_store.api_key),
		("providers.embedding", &cfg.providers.embedding.api_key),
		("providers.suggestions", &cfg.providers.suggestions.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("{label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.object_store
		.public_base
		.as_deref()
		.map(|base| base.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.object_store.public_base = None;
	}
}
