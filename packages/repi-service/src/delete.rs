use tracing::info;
use uuid::Uuid;

use crate::{RepiService, Result, required_user};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeleteRecipeRequest {
	pub user_id: String,
	pub recipe_id: Uuid,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecipeResponse {
	pub recipe_id: Uuid,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeleteAllRecipesResponse {
	pub deleted: u64,
}

impl RepiService {
	pub async fn delete_recipe(&self, req: DeleteRecipeRequest) -> Result<DeleteRecipeResponse> {
		let user_id = required_user(&req.user_id)?;

		repi_storage::recipes::delete(&self.db.pool, user_id, req.recipe_id).await?;

		info!(user_id, recipe_id = %req.recipe_id, "Recipe deleted.");

		Ok(DeleteRecipeResponse { recipe_id: req.recipe_id })
	}

	/// Account-reset path. Drops every recipe the caller owns.
	pub async fn delete_all_recipes(&self, user_id: &str) -> Result<DeleteAllRecipesResponse> {
		let user_id = required_user(user_id)?;
		let deleted = repi_storage::recipes::delete_all_for_owner(&self.db.pool, user_id).await?;

		info!(user_id, deleted, "All recipes deleted.");

		Ok(DeleteAllRecipesResponse { deleted })
	}
}
