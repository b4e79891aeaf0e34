use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use repi_domain::{RecipeDetail, RecipeDraft};

use crate::{Error, RepiService, Result, required_user};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ImportRecipeRequest {
	pub user_id: String,
	/// Free-form recipe text, e.g. pasted from a website or a note.
	pub text: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecipeResponse {
	pub recipe_id: Uuid,
	pub recipe: RecipeDetail,
}

impl RepiService {
	/// Turns free text into a structured recipe via the generator model, then
	/// stores it like a hand-entered one.
	pub async fn import_recipe(&self, req: ImportRecipeRequest) -> Result<ImportRecipeResponse> {
		let user_id = required_user(&req.user_id)?;
		let text = req.text.trim();

		if text.is_empty() {
			return Err(Error::InvalidRequest { message: "text is required.".to_string() });
		}

		let raw =
			self.providers.generator.generate(&self.cfg.providers.recipe_generator, text).await?;
		let draft: RecipeDraft = serde_json::from_value(raw).map_err(|err| Error::Provider {
			message: format!("Generator returned an invalid recipe: {err}."),
		})?;

		draft.validate()?;

		let detail = draft.into_detail(OffsetDateTime::now_utc());
		let (title_vec, ingredient_vecs) = self.embed_recipe(&detail).await?;

		repi_storage::recipes::create(&self.db.pool, user_id, &detail, &title_vec, &ingredient_vecs)
			.await?;

		info!(user_id, recipe_id = %detail.recipe_id, "Recipe imported.");

		Ok(ImportRecipeResponse { recipe_id: detail.recipe_id, recipe: detail })
	}
}
