use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use repi_domain::RecipeDraft;

use crate::{RepiService, Result, required_user};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateRecipeRequest {
	pub user_id: String,
	pub recipe: RecipeDraft,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeResponse {
	pub recipe_id: Uuid,
}

impl RepiService {
	pub async fn create_recipe(&self, req: CreateRecipeRequest) -> Result<CreateRecipeResponse> {
		let user_id = required_user(&req.user_id)?;

		req.recipe.validate()?;

		let detail = req.recipe.into_detail(OffsetDateTime::now_utc());
		let (title_vec, ingredient_vecs) = self.embed_recipe(&detail).await?;

		repi_storage::recipes::create(&self.db.pool, user_id, &detail, &title_vec, &ingredient_vecs)
			.await?;

		info!(user_id, recipe_id = %detail.recipe_id, "Recipe created.");

		Ok(CreateRecipeResponse { recipe_id: detail.recipe_id })
	}
}
