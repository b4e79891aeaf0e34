use time::OffsetDateTime;
use tracing::warn;

use repi_domain::RecipeListItem;
use repi_storage::cache;

use crate::{RepiService, Result, required_user};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ListRecipesRequest {
	pub user_id: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ListRecipesResponse {
	pub recipes: Vec<RecipeListItem>,
}

impl RepiService {
	/// The caller's recipe box, newest first.
	pub async fn list_recipes(&self, req: ListRecipesRequest) -> Result<ListRecipesResponse> {
		let user_id = required_user(&req.user_id)?;
		let key = cache::owner_listing_key(user_id);
		let now = OffsetDateTime::now_utc();

		if self.cfg.cache.enabled {
			match cache::get(&self.db.pool, &key, now).await {
				Ok(Some(payload)) => match serde_json::from_value::<Vec<RecipeListItem>>(payload) {
					Ok(recipes) => return Ok(ListRecipesResponse { recipes }),
					Err(err) => warn!(error = %err, key, "Cache payload decode failed."),
				},
				Ok(None) => {},
				Err(err) => warn!(error = %err, key, "Cache read failed."),
			}
		}

		let recipes = repi_storage::recipes::list_for_owner(&self.db.pool, user_id).await?;

		if self.cfg.cache.enabled {
			match serde_json::to_value(&recipes) {
				Ok(payload) =>
					if let Err(err) =
						cache::put(&self.db.pool, &key, &payload, now, self.cache_ttl()).await
					{
						warn!(error = %err, key, "Cache write failed.");
					},
				Err(err) => warn!(error = %err, key, "Cache payload encode failed."),
			}
		}

		Ok(ListRecipesResponse { recipes })
	}
}
