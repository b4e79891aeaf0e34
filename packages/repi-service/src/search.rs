use tracing::info;

use crate::{Error, RepiService, Result, ranking, ranking::RankedRecipe, required_user};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchRequest {
	pub user_id: String,
	#[serde(default)]
	pub ingredients: Vec<String>,
	#[serde(default)]
	pub title: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchResponse {
	pub items: Vec<RankedRecipe>,
}

impl RepiService {
	/// Semantic recipe search over the caller's own recipes. Each ingredient
	/// term runs its own nearest-neighbor query; the title term, when present,
	/// runs a separate query whose results are appended after deduplication.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let user_id = required_user(&req.user_id)?;
		let terms = req
			.ingredients
			.iter()
			.map(|term| term.trim())
			.filter(|term| !term.is_empty())
			.collect::<Vec<_>>();
		let title_term = req.title.as_deref().map(str::trim).filter(|term| !term.is_empty());

		// An empty query is a valid request for nothing.
		if terms.is_empty() && title_term.is_none() {
			return Ok(SearchResponse { items: Vec::new() });
		}

		// Vectorize every term before the first store query, so a bad term
		// fails the request without burning store calls.
		let mut term_vectors = Vec::with_capacity(terms.len());

		for term in &terms {
			term_vectors.push(self.embed_term(term).await?);
		}

		let title_vector = match title_term {
			Some(term) => Some(self.embed_term(term).await?),
			None => None,
		};

		let ingredient_branch = if term_vectors.is_empty() {
			None
		} else {
			let mut per_term = Vec::with_capacity(term_vectors.len());

			for vector in &term_vectors {
				let hits = self
					.store
					.nearest_by_ingredients(user_id, vector, self.cfg.search.ingredient_top_k)
					.await
					.map_err(|err| Error::SearchStore { message: err.to_string() })?;

				per_term.push(hits);
			}

			Some(ranking::aggregate_ingredient_hits(&per_term))
		};
		let title_branch = match title_vector {
			Some(vector) => {
				let hits = self
					.store
					.nearest_by_title(user_id, &vector, self.cfg.search.title_top_k)
					.await
					.map_err(|err| Error::SearchStore { message: err.to_string() })?;

				Some(ranking::rank_title_hits(&hits))
			},
			None => None,
		};
		let items = ranking::merge_branches(ingredient_branch, title_branch)?;

		info!(
			user_id,
			term_count = terms.len(),
			has_title = title_term.is_some(),
			result_count = items.len(),
			"Recipe search completed."
		);

		Ok(SearchResponse { items })
	}
}
