use std::sync::Arc;

use axum::{
	body::Body,
	http::{Request, StatusCode},
};
use tower::ServiceExt;
use uuid::Uuid;

use repi_api::{routes, state::AppState};
use repi_config::{
	Cache, Config, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Search, Service, Storage,
};
use repi_service::{
	BoxFuture, EmbeddingProvider, PgSearchStore, Providers, RecipeGenerator, RepiService,
};
use repi_storage::db::Db;
use repi_testkit::TestDatabase;

struct DeterministicEmbedder;
impl EmbeddingProvider for DeterministicEmbedder {
	fn embed_one<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async move { Ok(text_vector(text)) })
	}
}

struct UnusedGenerator;
impl RecipeGenerator for UnusedGenerator {
	fn generate<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<serde_json::Value>> {
		Box::pin(async { Err(color_eyre::eyre::eyre!("Generator is not used in these tests.")) })
	}
}

// Same text always maps to the same unit vector, so searching a stored
// ingredient term hits it at distance zero.
fn text_vector(text: &str) -> Vec<f32> {
	let mut vector = vec![0.0f32; 4];

	for (i, byte) in text.bytes().enumerate() {
		vector[i % 4] += byte as f32;
	}

	let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt().max(1.);

	vector.into_iter().map(|v| v / norm).collect()
}

fn test_config(dsn: &str) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn: dsn.to_string(), pool_max_conns: 2 } },
		providers: repi_config::Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "openai".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embed".to_string(),
				dimensions: 4,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
			recipe_generator: LlmProviderConfig {
				provider_id: "openai".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-llm".to_string(),
				temperature: 0.,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
		},
		search: Search::default(),
		cache: Cache::default(),
	}
}

async fn app_for(dsn: &str) -> axum::Router {
	let cfg = test_config(dsn);
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(4).await.expect("Failed to ensure schema.");

	let store = Arc::new(PgSearchStore::new(db.pool.clone()));
	let providers = Providers::new(Arc::new(DeterministicEmbedder), Arc::new(UnusedGenerator));
	let service = RepiService::with_providers(cfg, db, store, providers);

	routes::router(AppState { service: Arc::new(service) })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Response body is not JSON.")
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set REPI_PG_DSN to run."]
async fn create_then_search_roundtrip() {
	let Some(base_dsn) = repi_testkit::env_dsn() else {
		eprintln!("Skipping create_then_search_roundtrip; set REPI_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = app_for(test_db.dsn()).await;

	let draft = serde_json::json!({
		"title": "Chicken soup",
		"ingredientGroups": [
			{ "ingredients": [
				{ "ingredientName": "chicken" },
				{ "ingredientName": "leek" },
			] },
		],
	});
	let response = app
		.clone()
		.oneshot(
			Request::post("/v1/recipes")
				.header("x-user-id", "user-1")
				.header("content-type", "application/json")
				.body(Body::from(draft.to_string()))
				.expect("request"),
		)
		.await
		.expect("Failed to call create.");

	assert_eq!(response.status(), StatusCode::OK);

	let created = body_json(response).await;
	let recipe_id = created["recipeId"].as_str().expect("recipeId missing").to_string();

	Uuid::parse_str(&recipe_id).expect("recipeId is not a UUID");

	let response = app
		.clone()
		.oneshot(
			Request::get("/v1/recipes/search?ingredients=chicken")
				.header("x-user-id", "user-1")
				.body(Body::empty())
				.expect("request"),
		)
		.await
		.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::OK);

	let found = body_json(response).await;
	let items = found["items"].as_array().expect("items missing");

	assert_eq!(items.len(), 1);
	assert_eq!(items[0]["recipeId"].as_str(), Some(recipe_id.as_str()));

	// Another user sees nothing.
	let response = app
		.clone()
		.oneshot(
			Request::get("/v1/recipes/search?ingredients=chicken")
				.header("x-user-id", "user-2")
				.body(Body::empty())
				.expect("request"),
		)
		.await
		.expect("Failed to call search.");
	let found = body_json(response).await;

	assert!(found["items"].as_array().expect("items missing").is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set REPI_PG_DSN to run."]
async fn missing_user_header_is_a_bad_request() {
	let Some(base_dsn) = repi_testkit::env_dsn() else {
		eprintln!("Skipping missing_user_header_is_a_bad_request; set REPI_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = app_for(test_db.dsn()).await;

	let response = app
		.oneshot(Request::get("/v1/recipes").body(Body::empty()).expect("request"))
		.await
		.expect("Failed to call list.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body = body_json(response).await;

	assert_eq!(body["error_code"].as_str(), Some("invalid_request"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
