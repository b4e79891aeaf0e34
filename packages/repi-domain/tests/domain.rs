use std::collections::HashSet;

use time::macros::datetime;

use repi_domain::{
	IngredientDraft, IngredientGroupDraft, RecipeDetail, RecipeDraft, ValidationError,
};

fn sample_draft() -> RecipeDraft {
	RecipeDraft {
		title: "Chicken soup".to_string(),
		thumbnail_url: None,
		media_url: None,
		memo: Some("Weeknight staple.".to_string()),
		last_cooked_at: None,
		ingredient_groups: vec![
			IngredientGroupDraft {
				title: None,
				ingredients: vec![
					IngredientDraft { name: "chicken".to_string(), amount: Some("300g".to_string()) },
					IngredientDraft { name: "leek".to_string(), amount: None },
				],
			},
			IngredientGroupDraft {
				title: Some("Broth".to_string()),
				ingredients: vec![IngredientDraft {
					name: "soy sauce".to_string(),
					amount: Some("1 tbsp".to_string()),
				}],
			},
		],
	}
}

#[test]
fn valid_draft_passes_validation() {
	sample_draft().validate().expect("Sample draft must validate.");
}

#[test]
fn blank_title_rejected() {
	let mut draft = sample_draft();
	draft.title = "  ".to_string();

	assert!(matches!(draft.validate(), Err(ValidationError::TitleRequired)));
}

#[test]
fn blank_ingredient_name_rejected() {
	let mut draft = sample_draft();
	draft.ingredient_groups[0].ingredients[1].name = String::new();

	assert!(matches!(draft.validate(), Err(ValidationError::IngredientNameRequired)));
}

#[test]
fn empty_groups_allowed() {
	let mut draft = sample_draft();
	draft.ingredient_groups.push(IngredientGroupDraft { title: None, ingredients: Vec::new() });

	draft.validate().expect("Empty ingredient groups are allowed.");
}

#[test]
fn into_detail_assigns_ids_and_order_numbers() {
	let now = datetime!(2026-01-02 03:04:05 UTC);
	let detail = sample_draft().into_detail(now);

	assert_eq!(detail.created_at, now);
	assert_eq!(detail.ingredient_groups.len(), 2);
	assert_eq!(detail.ingredient_groups[0].order_num, 1);
	assert_eq!(detail.ingredient_groups[1].order_num, 2);
	assert_eq!(detail.ingredient_groups[0].ingredients[0].order_num, 1);
	assert_eq!(detail.ingredient_groups[0].ingredients[1].order_num, 2);
	assert_eq!(detail.ingredient_groups[1].ingredients[0].order_num, 1);

	let mut ids = HashSet::new();
	ids.insert(detail.recipe_id);
	for group in &detail.ingredient_groups {
		ids.insert(group.group_id);
		for ingredient in &group.ingredients {
			ids.insert(ingredient.ingredient_id);
		}
	}

	assert_eq!(ids.len(), 6, "All assigned ids must be distinct.");
}

#[test]
fn ingredient_names_flatten_in_group_then_ingredient_order() {
	let detail = sample_draft().into_detail(datetime!(2026-01-02 03:04:05 UTC));

	assert_eq!(detail.ingredient_names(), vec!["chicken", "leek", "soy sauce"]);
}

#[test]
fn detail_serializes_with_camel_case_keys_and_rfc3339_times() {
	let detail = sample_draft().into_detail(datetime!(2026-01-02 03:04:05 UTC));
	let json = serde_json::to_value(&detail).expect("Failed to serialize detail.");

	assert!(json.get("recipeId").is_some());
	assert!(json.get("thumbnailUrl").is_some());
	assert_eq!(json["createdAt"], serde_json::json!("2026-01-02T03:04:05Z"));
	let group = &json["ingredientGroups"][0];
	assert!(group.get("groupId").is_some());
	assert_eq!(group["ingredients"][0]["ingredientName"], serde_json::json!("chicken"));
	assert_eq!(group["ingredients"][0]["orderNum"], serde_json::json!(1));

	let roundtrip: RecipeDetail =
		serde_json::from_value(json).expect("Failed to deserialize detail.");

	assert_eq!(roundtrip, detail);
}

#[test]
fn generator_json_with_minimal_fields_parses_as_draft() {
	let json = serde_json::json!({
		"title": "Omelette",
		"ingredientGroups": [
			{
				"title": "",
				"ingredients": [
					{ "ingredientName": "egg", "amount": "2" },
					{ "ingredientName": "butter", "amount": "" }
				]
			}
		]
	});
	let draft: RecipeDraft = serde_json::from_value(json).expect("Failed to parse draft.");

	draft.validate().expect("Generator draft must validate.");
	assert_eq!(draft.ingredient_groups[0].ingredients.len(), 2);
}
