use time::OffsetDateTime;
use uuid::Uuid;

use repi_domain::RecipeSummary;

#[derive(Debug, sqlx::FromRow)]
pub struct RecipeRow {
	pub recipe_id: Uuid,
	pub owner_id: String,
	pub title: String,
	pub thumbnail_url: Option<String>,
	pub media_url: Option<String>,
	pub memo: Option<String>,
	pub created_at: OffsetDateTime,
	pub last_cooked_at: Option<OffsetDateTime>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct IngredientGroupRow {
	pub group_id: Uuid,
	pub recipe_id: Uuid,
	pub title: Option<String>,
	pub order_num: i32,
}

#[derive(Debug, sqlx::FromRow)]
pub struct IngredientRow {
	pub ingredient_id: Uuid,
	pub group_id: Uuid,
	pub name: String,
	pub amount: Option<String>,
	pub order_num: i32,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct NearestRecipeRow {
	pub recipe_id: Uuid,
	pub title: String,
	pub thumbnail_url: Option<String>,
	pub created_at: OffsetDateTime,
	pub distance: f32,
}

/// One nearest-neighbor hit: the matched recipe's summary and its pgvector
/// distance to the query vector (lower = closer).
#[derive(Clone, Debug, PartialEq)]
pub struct VectorHit {
	pub recipe_id: Uuid,
	pub distance: f32,
	pub summary: RecipeSummary,
}

impl From<NearestRecipeRow> for VectorHit {
	fn from(row: NearestRecipeRow) -> Self {
		Self {
			recipe_id: row.recipe_id,
			distance: row.distance,
			summary: RecipeSummary {
				recipe_id: row.recipe_id,
				title: row.title,
				thumbnail_url: row.thumbnail_url,
				created_at: row.created_at,
			},
		}
	}
}
