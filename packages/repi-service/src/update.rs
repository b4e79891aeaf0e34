use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use repi_domain::RecipeDraft;

use crate::{RepiService, Result, required_user};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateRecipeRequest {
	pub user_id: String,
	pub recipe_id: Uuid,
	pub recipe: RecipeDraft,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeResponse {
	pub recipe_id: Uuid,
}

impl RepiService {
	/// Full replacement of an owned recipe. Groups and ingredients get fresh
	/// ids; `created_at` survives in storage.
	pub async fn update_recipe(&self, req: UpdateRecipeRequest) -> Result<UpdateRecipeResponse> {
		let user_id = required_user(&req.user_id)?;

		req.recipe.validate()?;

		let mut detail = req.recipe.into_detail(OffsetDateTime::now_utc());

		detail.recipe_id = req.recipe_id;

		let (title_vec, ingredient_vecs) = self.embed_recipe(&detail).await?;

		repi_storage::recipes::update(&self.db.pool, user_id, &detail, &title_vec, &ingredient_vecs)
			.await?;

		info!(user_id, recipe_id = %req.recipe_id, "Recipe updated.");

		Ok(UpdateRecipeResponse { recipe_id: req.recipe_id })
	}
}
