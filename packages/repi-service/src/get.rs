use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use repi_domain::RecipeDetail;
use repi_storage::cache;

use crate::{Error, RepiService, Result, required_user};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GetRecipeRequest {
	pub user_id: String,
	pub recipe_id: Uuid,
}

/// Cached payload carries the owner so an id-keyed hit never serves another
/// user's recipe.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedRecipe {
	owner_id: String,
	recipe: RecipeDetail,
}

impl RepiService {
	pub async fn get_recipe(&self, req: GetRecipeRequest) -> Result<RecipeDetail> {
		let user_id = required_user(&req.user_id)?;
		let key = cache::recipe_key(req.recipe_id);
		let now = OffsetDateTime::now_utc();

		if self.cfg.cache.enabled {
			// Cache reads are best-effort; a broken cache degrades to a store
			// fetch.
			match cache::get(&self.db.pool, &key, now).await {
				Ok(Some(payload)) => match serde_json::from_value::<CachedRecipe>(payload) {
					Ok(cached) if cached.owner_id == user_id => return Ok(cached.recipe),
					Ok(_) => {},
					Err(err) => warn!(error = %err, key, "Cache payload decode failed."),
				},
				Ok(None) => {},
				Err(err) => warn!(error = %err, key, "Cache read failed."),
			}
		}

		let detail = repi_storage::recipes::fetch_detail(&self.db.pool, user_id, req.recipe_id)
			.await?
			.ok_or_else(|| Error::NotFound {
				message: format!("Recipe {} not found.", req.recipe_id),
			})?;

		if self.cfg.cache.enabled {
			let cached = CachedRecipe { owner_id: user_id.to_string(), recipe: detail };

			match serde_json::to_value(&cached) {
				Ok(payload) =>
					if let Err(err) =
						cache::put(&self.db.pool, &key, &payload, now, self.cache_ttl()).await
					{
						warn!(error = %err, key, "Cache write failed.");
					},
				Err(err) => warn!(error = %err, key, "Cache payload encode failed."),
			}

			return Ok(cached.recipe);
		}

		Ok(detail)
	}
}
