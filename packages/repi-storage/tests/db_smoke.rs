use repi_config::Postgres;
use repi_storage::{cache, db::Db, recipes};
use repi_testkit::TestDatabase;

use time::{Duration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set REPI_PG_DSN to run."]
async fn recipe_tables_exist_after_bootstrap() {
	let Some(base_dsn) = repi_testkit::env_dsn() else {
		eprintln!("Skipping recipe_tables_exist_after_bootstrap; set REPI_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(4).await.expect("Failed to ensure schema.");

	for table in ["recipes", "ingredient_groups", "ingredients", "api_cache"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Expected table {table} to exist.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set REPI_PG_DSN to run."]
async fn create_list_and_nearest_roundtrip() {
	let Some(base_dsn) = repi_testkit::env_dsn() else {
		eprintln!("Skipping create_list_and_nearest_roundtrip; set REPI_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(4).await.expect("Failed to ensure schema.");

	let owner = "owner-a";
	let draft: repi_domain::RecipeDraft = serde_json::from_value(serde_json::json!({
		"title": "Chicken soup",
		"ingredientGroups": [
			{ "title": null, "ingredients": [
				{ "ingredientName": "chicken" },
				{ "ingredientName": "leek" },
			] },
		],
	}))
	.expect("Failed to parse draft.");

	draft.validate().expect("Draft should be valid.");

	// Whole-second timestamp survives the TIMESTAMPTZ roundtrip exactly.
	let detail = draft.into_detail(datetime!(2026-02-03 04:05:06 UTC));
	let title_vec = vec![0.5, 0.5, 0., 0.];
	let ingredient_vecs = vec![vec![1., 0., 0., 0.], vec![0., 1., 0., 0.]];

	recipes::create(&db.pool, owner, &detail, &title_vec, &ingredient_vecs)
		.await
		.expect("Failed to create recipe.");

	let fetched = recipes::fetch_detail(&db.pool, owner, detail.recipe_id)
		.await
		.expect("Failed to fetch detail.")
		.expect("Recipe should exist.");

	assert_eq!(fetched, detail);
	assert!(
		recipes::fetch_detail(&db.pool, "someone-else", detail.recipe_id)
			.await
			.expect("Failed to fetch detail.")
			.is_none()
	);

	let listing = recipes::list_for_owner(&db.pool, owner).await.expect("Failed to list recipes.");

	assert_eq!(listing.len(), 1);
	assert_eq!(listing[0].ingredients_name, vec!["chicken", "leek"]);

	// Query vector equals the first ingredient vector, so its distance wins.
	let hits = recipes::nearest_by_ingredient_vector(&db.pool, owner, &[1., 0., 0., 0.], 10)
		.await
		.expect("Failed to run nearest query.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].recipe_id, detail.recipe_id);
	assert!(hits[0].distance.abs() < 1e-6);

	let title_hits = recipes::nearest_by_title_vector(&db.pool, owner, &[0.5, 0.5, 0., 0.], 20)
		.await
		.expect("Failed to run title nearest query.");

	assert_eq!(title_hits.len(), 1);

	// Other owners never see the recipe.
	assert!(
		recipes::nearest_by_ingredient_vector(&db.pool, "someone-else", &[1., 0., 0., 0.], 10)
			.await
			.expect("Failed to run nearest query.")
			.is_empty()
	);

	recipes::delete(&db.pool, owner, detail.recipe_id).await.expect("Failed to delete recipe.");

	assert!(
		recipes::fetch_detail(&db.pool, owner, detail.recipe_id)
			.await
			.expect("Failed to fetch detail.")
			.is_none()
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set REPI_PG_DSN to run."]
async fn cache_entries_expire_and_invalidate_with_writes() {
	let Some(base_dsn) = repi_testkit::env_dsn() else {
		eprintln!(
			"Skipping cache_entries_expire_and_invalidate_with_writes; set REPI_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(4).await.expect("Failed to ensure schema.");

	let now = OffsetDateTime::now_utc();
	let key = cache::recipe_key(Uuid::new_v4());
	let payload = serde_json::json!({ "title": "Chicken soup" });

	cache::put(&db.pool, &key, &payload, now, Duration::minutes(10))
		.await
		.expect("Failed to put cache entry.");

	assert_eq!(
		cache::get(&db.pool, &key, now).await.expect("Failed to get cache entry."),
		Some(payload.clone())
	);
	// Past the TTL the entry reads as absent.
	assert_eq!(
		cache::get(&db.pool, &key, now + Duration::minutes(11))
			.await
			.expect("Failed to get cache entry."),
		None
	);

	// A write under the owner drops the listing key.
	let owner = "owner-b";
	let listing_key = cache::owner_listing_key(owner);

	cache::put(&db.pool, &listing_key, &payload, now, Duration::minutes(10))
		.await
		.expect("Failed to put cache entry.");

	let draft: repi_domain::RecipeDraft = serde_json::from_value(serde_json::json!({
		"title": "Stew",
		"ingredientGroups": [
			{ "ingredients": [{ "ingredientName": "beef" }] },
		],
	}))
	.expect("Failed to parse draft.");
	let detail = draft.into_detail(now);

	recipes::create(&db.pool, owner, &detail, &[0., 0., 0., 1.], &[vec![0., 0., 1., 0.]])
		.await
		.expect("Failed to create recipe.");

	assert_eq!(
		cache::get(&db.pool, &listing_key, now).await.expect("Failed to get cache entry."),
		None
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
