pub mod recipe;
pub mod rfc3339;

pub use recipe::{
	Ingredient, IngredientDraft, IngredientGroup, IngredientGroupDraft, RecipeDetail, RecipeDraft,
	RecipeListItem, RecipeSummary, ValidationError,
};
