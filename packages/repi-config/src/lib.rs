mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Config, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers, Search, Service,
	Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Toml { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Invalid("service.http_bind must be non-empty.".to_string()));
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Invalid("storage.postgres.dsn must be non-empty.".to_string()));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Invalid(
			"storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		));
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Invalid(
			"providers.embedding.dimensions must be greater than zero.".to_string(),
		));
	}
	if cfg.search.ingredient_top_k == 0 {
		return Err(Error::Invalid("search.ingredient_top_k must be greater than zero.".to_string()));
	}
	if cfg.search.title_top_k == 0 {
		return Err(Error::Invalid("search.title_top_k must be greater than zero.".to_string()));
	}
	if cfg.cache.ttl_minutes <= 0 {
		return Err(Error::Invalid("cache.ttl_minutes must be greater than zero.".to_string()));
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("recipe_generator", &cfg.providers.recipe_generator.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Invalid(format!("Provider {label} api_key must be non-empty.")));
		}
	}

	Ok(())
}
