use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Listing/search view of a recipe. Wire format matches the client DTOs:
/// camelCase keys, RFC3339 timestamps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
	pub recipe_id: Uuid,
	pub title: String,
	pub thumbnail_url: Option<String>,
	#[serde(with = "crate::rfc3339")]
	pub created_at: OffsetDateTime,
}

/// Summary plus the flat ingredient-name list shown in the recipe box view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListItem {
	pub recipe_id: Uuid,
	pub title: String,
	pub thumbnail_url: Option<String>,
	#[serde(with = "crate::rfc3339")]
	pub created_at: OffsetDateTime,
	pub ingredients_name: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
	#[serde(rename = "id")]
	pub ingredient_id: Uuid,
	#[serde(rename = "ingredientName")]
	pub name: String,
	pub amount: Option<String>,
	pub order_num: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientGroup {
	pub group_id: Uuid,
	pub title: Option<String>,
	pub order_num: i32,
	pub ingredients: Vec<Ingredient>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
	pub recipe_id: Uuid,
	pub title: String,
	pub thumbnail_url: Option<String>,
	pub media_url: Option<String>,
	pub memo: Option<String>,
	#[serde(with = "crate::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::rfc3339::option", default)]
	pub last_cooked_at: Option<OffsetDateTime>,
	pub ingredient_groups: Vec<IngredientGroup>,
}
impl RecipeDetail {
	/// Ingredient names flattened in group order then ingredient order. This is
	/// the canonical order used when embedding ingredient vectors.
	pub fn ingredient_names(&self) -> Vec<&str> {
		self.ingredient_groups
			.iter()
			.flat_map(|group| group.ingredients.iter())
			.map(|ingredient| ingredient.name.as_str())
			.collect()
	}

	pub fn summary(&self) -> RecipeSummary {
		RecipeSummary {
			recipe_id: self.recipe_id,
			title: self.title.clone(),
			thumbnail_url: self.thumbnail_url.clone(),
			created_at: self.created_at,
		}
	}
}

/// Client- or generator-submitted recipe before the service assigns ids and
/// order numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
	pub title: String,
	#[serde(default)]
	pub thumbnail_url: Option<String>,
	#[serde(default)]
	pub media_url: Option<String>,
	#[serde(default)]
	pub memo: Option<String>,
	#[serde(with = "crate::rfc3339::option", default)]
	pub last_cooked_at: Option<OffsetDateTime>,
	#[serde(default)]
	pub ingredient_groups: Vec<IngredientGroupDraft>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientGroupDraft {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub ingredients: Vec<IngredientDraft>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDraft {
	#[serde(rename = "ingredientName")]
	pub name: String,
	#[serde(default)]
	pub amount: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
	#[error("Recipe title is required.")]
	TitleRequired,
	#[error("Ingredient name is required.")]
	IngredientNameRequired,
}

impl RecipeDraft {
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.title.trim().is_empty() {
			return Err(ValidationError::TitleRequired);
		}

		// Empty groups are allowed; named-but-empty ingredients are not.
		for group in &self.ingredient_groups {
			for ingredient in &group.ingredients {
				if ingredient.name.trim().is_empty() {
					return Err(ValidationError::IngredientNameRequired);
				}
			}
		}

		Ok(())
	}

	/// Assign fresh ids and 1-based order numbers, producing the persistable
	/// detail. Drafts never carry ids, so every materialization is new.
	pub fn into_detail(self, now: OffsetDateTime) -> RecipeDetail {
		let ingredient_groups = self
			.ingredient_groups
			.into_iter()
			.enumerate()
			.map(|(group_index, group)| IngredientGroup {
				group_id: Uuid::new_v4(),
				title: group.title,
				order_num: group_index as i32 + 1,
				ingredients: group
					.ingredients
					.into_iter()
					.enumerate()
					.map(|(ingredient_index, ingredient)| Ingredient {
						ingredient_id: Uuid::new_v4(),
						name: ingredient.name,
						amount: ingredient.amount,
						order_num: ingredient_index as i32 + 1,
					})
					.collect(),
			})
			.collect();

		RecipeDetail {
			recipe_id: Uuid::new_v4(),
			title: self.title,
			thumbnail_url: self.thumbnail_url,
			media_url: self.media_url,
			memo: self.memo,
			created_at: now,
			last_cooked_at: self.last_cooked_at,
			ingredient_groups,
		}
	}
}
