use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use repi_domain::{RecipeDetail, RecipeDraft};
use repi_service::{
	CreateRecipeRequest, CreateRecipeResponse, DeleteAllRecipesResponse, DeleteRecipeRequest,
	DeleteRecipeResponse, Error as ServiceError, GetRecipeRequest, ImportRecipeRequest,
	ImportRecipeResponse, ListRecipesRequest, ListRecipesResponse, SearchRequest, SearchResponse,
	UpdateRecipeRequest, UpdateRecipeResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/recipes", get(list).post(create).delete(delete_all))
		.route("/v1/recipes/search", get(search))
		.route("/v1/recipes/import", post(import))
		.route("/v1/recipes/{id}", get(get_recipe).put(update).delete(delete_recipe))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct SearchParams {
	/// Comma-separated ingredient terms.
	#[serde(default)]
	ingredients: Option<String>,
	#[serde(default)]
	title: Option<String>,
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
	let user_id = user_id(&headers)?;
	let ingredients = params
		.ingredients
		.as_deref()
		.map(|raw| raw.split(',').map(|term| term.to_string()).collect())
		.unwrap_or_default();
	let response =
		state.service.search(SearchRequest { user_id, ingredients, title: params.title }).await?;
	Ok(Json(response))
}

async fn create(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(recipe): Json<RecipeDraft>,
) -> Result<Json<CreateRecipeResponse>, ApiError> {
	let user_id = user_id(&headers)?;
	let response = state.service.create_recipe(CreateRecipeRequest { user_id, recipe }).await?;
	Ok(Json(response))
}

async fn list(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<ListRecipesResponse>, ApiError> {
	let user_id = user_id(&headers)?;
	let response = state.service.list_recipes(ListRecipesRequest { user_id }).await?;
	Ok(Json(response))
}

async fn get_recipe(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetail>, ApiError> {
	let user_id = user_id(&headers)?;
	let response = state.service.get_recipe(GetRecipeRequest { user_id, recipe_id: id }).await?;
	Ok(Json(response))
}

async fn update(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<Uuid>,
	Json(recipe): Json<RecipeDraft>,
) -> Result<Json<UpdateRecipeResponse>, ApiError> {
	let user_id = user_id(&headers)?;
	let response = state
		.service
		.update_recipe(UpdateRecipeRequest { user_id, recipe_id: id, recipe })
		.await?;
	Ok(Json(response))
}

async fn delete_recipe(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<Uuid>,
) -> Result<Json<DeleteRecipeResponse>, ApiError> {
	let user_id = user_id(&headers)?;
	let response =
		state.service.delete_recipe(DeleteRecipeRequest { user_id, recipe_id: id }).await?;
	Ok(Json(response))
}

async fn delete_all(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<DeleteAllRecipesResponse>, ApiError> {
	let user_id = user_id(&headers)?;
	let response = state.service.delete_all_recipes(&user_id).await?;
	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct ImportBody {
	text: String,
}

async fn import(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(body): Json<ImportBody>,
) -> Result<Json<ImportRecipeResponse>, ApiError> {
	let user_id = user_id(&headers)?;
	let response =
		state.service.import_recipe(ImportRecipeRequest { user_id, text: body.text }).await?;
	Ok(Json(response))
}

fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
	headers
		.get("x-user-id")
		.and_then(|value| value.to_str().ok())
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
		.ok_or_else(|| {
			json_error(StatusCode::BAD_REQUEST, "invalid_request", "Missing x-user-id header.")
		})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();
		match err {
			ServiceError::InvalidRequest { .. } | ServiceError::Validation(_) => {
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message)
			},
			ServiceError::NotFound { .. } => {
				json_error(StatusCode::NOT_FOUND, "not_found", message)
			},
			ServiceError::Embedding { .. } => {
				json_error(StatusCode::BAD_GATEWAY, "embedding_failure", message)
			},
			ServiceError::SearchStore { .. } => {
				json_error(StatusCode::BAD_GATEWAY, "search_store_failure", message)
			},
			ServiceError::Provider { .. } => {
				json_error(StatusCode::BAD_GATEWAY, "provider_failure", message)
			},
			ServiceError::Merge { .. } => {
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "merge_internal", message)
			},
			ServiceError::Storage { .. } => {
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_failure", message)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };
		(self.status, Json(body)).into_response()
	}
}
