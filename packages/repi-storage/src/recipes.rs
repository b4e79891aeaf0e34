//! Recipe persistence and pgvector nearest-neighbor queries.
//!
//! Writes run in a single transaction and delete the affected cache keys
//! before commit, so invalidation only lands when the write does.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use repi_domain::{Ingredient, IngredientGroup, RecipeDetail, RecipeListItem};

use crate::{
	Error, Result, cache,
	models::{IngredientGroupRow, IngredientRow, NearestRecipeRow, RecipeRow, VectorHit},
};

/// pgvector text literal, e.g. `[0.1,0.2]`. Bound as TEXT and cast server-side.
fn vector_to_pg(vector: &[f32]) -> String {
	let parts = vector.iter().map(|v| v.to_string()).collect::<Vec<_>>();

	format!("[{}]", parts.join(","))
}

/// Ingredient vectors must align with [`RecipeDetail::ingredient_names`].
pub async fn create(
	pool: &PgPool,
	owner_id: &str,
	detail: &RecipeDetail,
	title_vec: &[f32],
	ingredient_vecs: &[Vec<f32>],
) -> Result<()> {
	check_vector_count(detail, ingredient_vecs)?;

	let mut tx = pool.begin().await?;

	sqlx::query(
		"INSERT INTO recipes (recipe_id, owner_id, title, thumbnail_url, media_url, memo, created_at, last_cooked_at, title_vec) \
		 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::text::vector)",
	)
	.bind(detail.recipe_id)
	.bind(owner_id)
	.bind(&detail.title)
	.bind(&detail.thumbnail_url)
	.bind(&detail.media_url)
	.bind(&detail.memo)
	.bind(detail.created_at)
	.bind(detail.last_cooked_at)
	.bind(vector_to_pg(title_vec))
	.execute(&mut *tx)
	.await?;

	insert_groups(&mut tx, detail, ingredient_vecs).await?;
	cache::delete_tx(&mut tx, &cache::owner_listing_key(owner_id)).await?;

	tx.commit().await?;

	Ok(())
}

/// Replaces the recipe row and all its groups and ingredients. `created_at`
/// is preserved.
pub async fn update(
	pool: &PgPool,
	owner_id: &str,
	detail: &RecipeDetail,
	title_vec: &[f32],
	ingredient_vecs: &[Vec<f32>],
) -> Result<()> {
	check_vector_count(detail, ingredient_vecs)?;

	let mut tx = pool.begin().await?;

	assert_owned(&mut tx, owner_id, detail.recipe_id).await?;

	sqlx::query(
		"UPDATE recipes SET title = $2, thumbnail_url = $3, media_url = $4, memo = $5, \
		 last_cooked_at = $6, title_vec = $7::text::vector WHERE recipe_id = $1",
	)
	.bind(detail.recipe_id)
	.bind(&detail.title)
	.bind(&detail.thumbnail_url)
	.bind(&detail.media_url)
	.bind(&detail.memo)
	.bind(detail.last_cooked_at)
	.bind(vector_to_pg(title_vec))
	.execute(&mut *tx)
	.await?;
	// Ingredient cascade removes the old rows.
	sqlx::query("DELETE FROM ingredient_groups WHERE recipe_id = $1")
		.bind(detail.recipe_id)
		.execute(&mut *tx)
		.await?;

	insert_groups(&mut tx, detail, ingredient_vecs).await?;
	cache::delete_tx(&mut tx, &cache::recipe_key(detail.recipe_id)).await?;
	cache::delete_tx(&mut tx, &cache::owner_listing_key(owner_id)).await?;

	tx.commit().await?;

	Ok(())
}

pub async fn delete(pool: &PgPool, owner_id: &str, recipe_id: Uuid) -> Result<()> {
	let mut tx = pool.begin().await?;

	assert_owned(&mut tx, owner_id, recipe_id).await?;

	sqlx::query("DELETE FROM recipes WHERE recipe_id = $1")
		.bind(recipe_id)
		.execute(&mut *tx)
		.await?;
	cache::delete_tx(&mut tx, &cache::recipe_key(recipe_id)).await?;
	cache::delete_tx(&mut tx, &cache::owner_listing_key(owner_id)).await?;

	tx.commit().await?;

	Ok(())
}

/// Removes every recipe the owner has. Returns the number of recipes deleted.
pub async fn delete_all_for_owner(pool: &PgPool, owner_id: &str) -> Result<u64> {
	let mut tx = pool.begin().await?;
	let recipe_ids: Vec<Uuid> = sqlx::query_scalar("SELECT recipe_id FROM recipes WHERE owner_id = $1")
		.bind(owner_id)
		.fetch_all(&mut *tx)
		.await?;

	sqlx::query("DELETE FROM recipes WHERE owner_id = $1").bind(owner_id).execute(&mut *tx).await?;

	for recipe_id in &recipe_ids {
		cache::delete_tx(&mut tx, &cache::recipe_key(*recipe_id)).await?;
	}

	cache::delete_tx(&mut tx, &cache::owner_listing_key(owner_id)).await?;

	tx.commit().await?;

	Ok(recipe_ids.len() as u64)
}

pub async fn fetch_detail(
	pool: &PgPool,
	owner_id: &str,
	recipe_id: Uuid,
) -> Result<Option<RecipeDetail>> {
	let Some(recipe) = sqlx::query_as::<_, RecipeRow>(
		"SELECT recipe_id, owner_id, title, thumbnail_url, media_url, memo, created_at, last_cooked_at \
		 FROM recipes WHERE recipe_id = $1 AND owner_id = $2",
	)
	.bind(recipe_id)
	.bind(owner_id)
	.fetch_optional(pool)
	.await?
	else {
		return Ok(None);
	};
	let group_rows = sqlx::query_as::<_, IngredientGroupRow>(
		"SELECT group_id, recipe_id, title, order_num FROM ingredient_groups \
		 WHERE recipe_id = $1 ORDER BY order_num ASC",
	)
	.bind(recipe_id)
	.fetch_all(pool)
	.await?;
	let ingredient_rows = sqlx::query_as::<_, IngredientRow>(
		"SELECT i.ingredient_id, i.group_id, i.name, i.amount, i.order_num \
		 FROM ingredients i JOIN ingredient_groups g ON g.group_id = i.group_id \
		 WHERE g.recipe_id = $1 ORDER BY g.order_num ASC, i.order_num ASC",
	)
	.bind(recipe_id)
	.fetch_all(pool)
	.await?;
	let mut by_group: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();

	for row in ingredient_rows {
		by_group.entry(row.group_id).or_default().push(Ingredient {
			ingredient_id: row.ingredient_id,
			name: row.name,
			amount: row.amount,
			order_num: row.order_num,
		});
	}

	let ingredient_groups = group_rows
		.into_iter()
		.map(|row| IngredientGroup {
			ingredients: by_group.remove(&row.group_id).unwrap_or_default(),
			group_id: row.group_id,
			title: row.title,
			order_num: row.order_num,
		})
		.collect();

	Ok(Some(RecipeDetail {
		recipe_id: recipe.recipe_id,
		title: recipe.title,
		thumbnail_url: recipe.thumbnail_url,
		media_url: recipe.media_url,
		memo: recipe.memo,
		created_at: recipe.created_at,
		last_cooked_at: recipe.last_cooked_at,
		ingredient_groups,
	}))
}

/// Newest first, with the flattened ingredient names attached.
pub async fn list_for_owner(pool: &PgPool, owner_id: &str) -> Result<Vec<RecipeListItem>> {
	let recipes = sqlx::query_as::<_, RecipeRow>(
		"SELECT recipe_id, owner_id, title, thumbnail_url, media_url, memo, created_at, last_cooked_at \
		 FROM recipes WHERE owner_id = $1 ORDER BY created_at DESC, recipe_id ASC",
	)
	.bind(owner_id)
	.fetch_all(pool)
	.await?;
	let names: Vec<(Uuid, String)> = sqlx::query_as(
		"SELECT r.recipe_id, i.name FROM recipes r \
		 JOIN ingredient_groups g ON g.recipe_id = r.recipe_id \
		 JOIN ingredients i ON i.group_id = g.group_id \
		 WHERE r.owner_id = $1 ORDER BY g.order_num ASC, i.order_num ASC",
	)
	.bind(owner_id)
	.fetch_all(pool)
	.await?;
	let mut names_by_recipe: HashMap<Uuid, Vec<String>> = HashMap::new();

	for (recipe_id, name) in names {
		names_by_recipe.entry(recipe_id).or_default().push(name);
	}

	Ok(recipes
		.into_iter()
		.map(|row| RecipeListItem {
			ingredients_name: names_by_recipe.remove(&row.recipe_id).unwrap_or_default(),
			recipe_id: row.recipe_id,
			title: row.title,
			thumbnail_url: row.thumbnail_url,
			created_at: row.created_at,
		})
		.collect())
}

/// Nearest recipes by ingredient vector, scored by each recipe's closest
/// ingredient. Ties break on recipe id so results are stable.
pub async fn nearest_by_ingredient_vector(
	pool: &PgPool,
	owner_id: &str,
	vector: &[f32],
	top_k: u32,
) -> Result<Vec<VectorHit>> {
	let rows = sqlx::query_as::<_, NearestRecipeRow>(
		"SELECT r.recipe_id, r.title, r.thumbnail_url, r.created_at, \
		   (MIN(i.vec <-> $2::text::vector))::real AS distance \
		 FROM recipes r \
		 JOIN ingredient_groups g ON g.recipe_id = r.recipe_id \
		 JOIN ingredients i ON i.group_id = g.group_id \
		 WHERE r.owner_id = $1 AND i.vec IS NOT NULL \
		 GROUP BY r.recipe_id, r.title, r.thumbnail_url, r.created_at \
		 ORDER BY distance ASC, r.recipe_id ASC \
		 LIMIT $3",
	)
	.bind(owner_id)
	.bind(vector_to_pg(vector))
	.bind(top_k as i64)
	.fetch_all(pool)
	.await?;

	Ok(rows.into_iter().map(VectorHit::from).collect())
}

pub async fn nearest_by_title_vector(
	pool: &PgPool,
	owner_id: &str,
	vector: &[f32],
	top_k: u32,
) -> Result<Vec<VectorHit>> {
	let rows = sqlx::query_as::<_, NearestRecipeRow>(
		"SELECT recipe_id, title, thumbnail_url, created_at, \
		   (title_vec <-> $2::text::vector)::real AS distance \
		 FROM recipes \
		 WHERE owner_id = $1 AND title_vec IS NOT NULL \
		 ORDER BY distance ASC, recipe_id ASC \
		 LIMIT $3",
	)
	.bind(owner_id)
	.bind(vector_to_pg(vector))
	.bind(top_k as i64)
	.fetch_all(pool)
	.await?;

	Ok(rows.into_iter().map(VectorHit::from).collect())
}

fn check_vector_count(detail: &RecipeDetail, ingredient_vecs: &[Vec<f32>]) -> Result<()> {
	let ingredient_count = detail.ingredient_names().len();

	if ingredient_vecs.len() != ingredient_count {
		return Err(Error::InvalidArgument(format!(
			"Expected {ingredient_count} ingredient vectors, got {}.",
			ingredient_vecs.len()
		)));
	}

	Ok(())
}

async fn assert_owned(
	tx: &mut Transaction<'_, Postgres>,
	owner_id: &str,
	recipe_id: Uuid,
) -> Result<()> {
	let count: i64 =
		sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE recipe_id = $1 AND owner_id = $2")
			.bind(recipe_id)
			.bind(owner_id)
			.fetch_one(&mut **tx)
			.await?;

	if count == 0 {
		return Err(Error::NotFound(format!("Recipe {recipe_id} not found for this user.")));
	}

	Ok(())
}

async fn insert_groups(
	tx: &mut Transaction<'_, Postgres>,
	detail: &RecipeDetail,
	ingredient_vecs: &[Vec<f32>],
) -> Result<()> {
	let mut vecs = ingredient_vecs.iter();

	for group in &detail.ingredient_groups {
		sqlx::query(
			"INSERT INTO ingredient_groups (group_id, recipe_id, title, order_num) \
			 VALUES ($1, $2, $3, $4)",
		)
		.bind(group.group_id)
		.bind(detail.recipe_id)
		.bind(&group.title)
		.bind(group.order_num)
		.execute(&mut **tx)
		.await?;

		for ingredient in &group.ingredients {
			let vec = vecs
				.next()
				.ok_or_else(|| Error::InvalidArgument("Missing ingredient vector.".into()))?;

			sqlx::query(
				"INSERT INTO ingredients (ingredient_id, group_id, name, amount, order_num, vec) \
				 VALUES ($1, $2, $3, $4, $5, $6::text::vector)",
			)
			.bind(ingredient.ingredient_id)
			.bind(group.group_id)
			.bind(&ingredient.name)
			.bind(&ingredient.amount)
			.bind(ingredient.order_num)
			.bind(vector_to_pg(vec))
			.execute(&mut **tx)
			.await?;
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vector_renders_as_pg_literal() {
		assert_eq!(vector_to_pg(&[0.25, -1., 3.5]), "[0.25,-1,3.5]");
		assert_eq!(vector_to_pg(&[]), "[]");
	}
}
