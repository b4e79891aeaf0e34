pub mod create;
pub mod delete;
pub mod get;
pub mod import;
pub mod list;
pub mod ranking;
pub mod search;
pub mod update;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

pub use create::{CreateRecipeRequest, CreateRecipeResponse};
pub use delete::{DeleteAllRecipesResponse, DeleteRecipeRequest, DeleteRecipeResponse};
pub use error::Error;
pub use get::GetRecipeRequest;
pub use import::{ImportRecipeRequest, ImportRecipeResponse};
pub use list::{ListRecipesRequest, ListRecipesResponse};
pub use ranking::{MATCH_BONUS_WEIGHT, RankedRecipe};
pub use search::{SearchRequest, SearchResponse};
pub use update::{UpdateRecipeRequest, UpdateRecipeResponse};

use repi_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use repi_domain::RecipeDetail;
use repi_providers::{embedding, generator};
use repi_storage::{db::Db, models::VectorHit};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_one<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

pub trait RecipeGenerator
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Value>>;
}

/// Owner-scoped nearest-neighbor lookups. The default implementation runs
/// against Postgres; tests script their own.
pub trait SearchStore
where
	Self: Send + Sync,
{
	fn nearest_by_ingredients<'a>(
		&'a self,
		owner_id: &'a str,
		vector: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, repi_storage::Result<Vec<VectorHit>>>;

	fn nearest_by_title<'a>(
		&'a self,
		owner_id: &'a str,
		vector: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, repi_storage::Result<Vec<VectorHit>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generator: Arc<dyn RecipeGenerator>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed_one<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(embedding::embed_one(cfg, text))
	}
}

impl RecipeGenerator for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(generator::generate(cfg, text))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, generator: Arc<dyn RecipeGenerator>) -> Self {
		Self { embedding, generator }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), generator: provider }
	}
}

pub struct PgSearchStore {
	pool: sqlx::PgPool,
}
impl PgSearchStore {
	pub fn new(pool: sqlx::PgPool) -> Self {
		Self { pool }
	}
}
impl SearchStore for PgSearchStore {
	fn nearest_by_ingredients<'a>(
		&'a self,
		owner_id: &'a str,
		vector: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, repi_storage::Result<Vec<VectorHit>>> {
		Box::pin(repi_storage::recipes::nearest_by_ingredient_vector(
			&self.pool, owner_id, vector, top_k,
		))
	}

	fn nearest_by_title<'a>(
		&'a self,
		owner_id: &'a str,
		vector: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, repi_storage::Result<Vec<VectorHit>>> {
		Box::pin(repi_storage::recipes::nearest_by_title_vector(&self.pool, owner_id, vector, top_k))
	}
}

pub struct RepiService {
	pub cfg: Config,
	pub db: Db,
	pub store: Arc<dyn SearchStore>,
	pub providers: Providers,
}
impl RepiService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let store = Arc::new(PgSearchStore::new(db.pool.clone()));

		Self { cfg, db, store, providers: Providers::default() }
	}

	pub fn with_providers(
		cfg: Config,
		db: Db,
		store: Arc<dyn SearchStore>,
		providers: Providers,
	) -> Self {
		Self { cfg, db, store, providers }
	}

	/// One embed call per term. Failures carry the offending term.
	pub(crate) async fn embed_term(&self, term: &str) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let vector = self
			.providers
			.embedding
			.embed_one(cfg, term)
			.await
			.map_err(|err| Error::Embedding { term: term.to_string(), message: err.to_string() })?;

		if vector.len() != cfg.dimensions as usize {
			return Err(Error::Embedding {
				term: term.to_string(),
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}

	/// Title vector plus one vector per ingredient, in the canonical
	/// flattened order.
	pub(crate) async fn embed_recipe(
		&self,
		detail: &RecipeDetail,
	) -> Result<(Vec<f32>, Vec<Vec<f32>>)> {
		let title_vec = self.embed_term(&detail.title).await?;
		let names = detail.ingredient_names();
		let mut ingredient_vecs = Vec::with_capacity(names.len());

		for name in names {
			ingredient_vecs.push(self.embed_term(name).await?);
		}

		Ok((title_vec, ingredient_vecs))
	}

	pub(crate) fn cache_ttl(&self) -> time::Duration {
		time::Duration::minutes(self.cfg.cache.ttl_minutes)
	}
}

pub(crate) fn required_user(user_id: &str) -> Result<&str> {
	let trimmed = user_id.trim();

	if trimmed.is_empty() {
		return Err(Error::InvalidRequest { message: "user_id is required.".to_string() });
	}

	Ok(trimmed)
}
