//! Score aggregation and branch merging for recipe search.
//!
//! Scores are pgvector distances, lower is better. A recipe hit by several
//! query terms averages its distances and then earns a bonus per match, so
//! broad matches outrank narrow ones with the same average.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use repi_domain::RecipeSummary;
use repi_storage::models::VectorHit;

use crate::{Error, Result};

/// Subtracted from the composite once per matched term.
pub const MATCH_BONUS_WEIGHT: f32 = 0.1;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRecipe {
	/// Composite score, ascending. `average distance - bonus * match_count`.
	pub score: f32,
	/// Closest single distance among the hits that produced this entry.
	pub best_distance: f32,
	pub match_count: u32,
	#[serde(flatten)]
	pub summary: RecipeSummary,
}

struct Candidate {
	total: f32,
	best: f32,
	matches: u32,
	summary: RecipeSummary,
}

/// Folds the per-term hit lists into one ranked list. Each inner list is the
/// result of one term's nearest-neighbor query.
pub fn aggregate_ingredient_hits(per_term: &[Vec<VectorHit>]) -> Vec<RankedRecipe> {
	let mut candidates: HashMap<Uuid, Candidate> = HashMap::new();

	for hits in per_term {
		for hit in hits {
			match candidates.get_mut(&hit.recipe_id) {
				Some(candidate) => {
					candidate.total += hit.distance;
					candidate.matches += 1;

					if hit.distance < candidate.best {
						candidate.best = hit.distance;
					}
				},
				None => {
					candidates.insert(hit.recipe_id, Candidate {
						total: hit.distance,
						best: hit.distance,
						matches: 1,
						summary: hit.summary.clone(),
					});
				},
			}
		}
	}

	let mut ranked = candidates
		.into_values()
		.map(|candidate| RankedRecipe {
			score: candidate.total / candidate.matches as f32
				- MATCH_BONUS_WEIGHT * candidate.matches as f32,
			best_distance: candidate.best,
			match_count: candidate.matches,
			summary: candidate.summary,
		})
		.collect::<Vec<_>>();

	sort_ranked(&mut ranked);

	ranked
}

/// The title branch runs a single query, so its distance is the score as-is.
pub fn rank_title_hits(hits: &[VectorHit]) -> Vec<RankedRecipe> {
	let mut ranked = hits
		.iter()
		.map(|hit| RankedRecipe {
			score: hit.distance,
			best_distance: hit.distance,
			match_count: 1,
			summary: hit.summary.clone(),
		})
		.collect::<Vec<_>>();

	sort_ranked(&mut ranked);

	ranked
}

/// Ingredient results keep their order and come first; title results follow,
/// minus recipes the ingredient branch already produced. A single branch
/// passes through unchanged. Duplicate ids inside one branch mean a ranking
/// bug upstream and fail the merge.
pub fn merge_branches(
	ingredient: Option<Vec<RankedRecipe>>,
	title: Option<Vec<RankedRecipe>>,
) -> Result<Vec<RankedRecipe>> {
	let mut merged = Vec::new();
	let mut seen: HashSet<Uuid> = HashSet::new();

	for branch in [ingredient, title].into_iter().flatten() {
		let mut branch_seen: HashSet<Uuid> = HashSet::new();

		for item in branch {
			let recipe_id = item.summary.recipe_id;

			if !branch_seen.insert(recipe_id) {
				return Err(Error::Merge {
					message: format!("Duplicate recipe {recipe_id} within a ranked branch."),
				});
			}
			if seen.insert(recipe_id) {
				merged.push(item);
			}
		}
	}

	Ok(merged)
}

fn sort_ranked(ranked: &mut [RankedRecipe]) {
	ranked.sort_by(|a, b| {
		a.score
			.partial_cmp(&b.score)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| a.summary.recipe_id.cmp(&b.summary.recipe_id))
	});
}
