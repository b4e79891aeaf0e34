use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Turn raw recipe text (already extracted from whatever source) into the
/// structured draft JSON the service persists. Returns the parsed JSON value;
/// the caller deserializes it into a draft and validates it.
pub async fn generate(cfg: &repi_config::LlmProviderConfig, text: &str) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let messages = build_messages(text);

	for _ in 0..3 {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;
		if let Ok(parsed) = parse_generator_json(json) {
			return Ok(parsed);
		}
	}

	Err(eyre::eyre!("Recipe generator response is not valid JSON."))
}

fn build_messages(text: &str) -> Vec<Value> {
	let schema = serde_json::json!({
		"title": "string",
		"ingredientGroups": [
			{
				"title": "string",
				"ingredients": [
					{ "ingredientName": "string", "amount": "string" }
				]
			}
		]
	});
	let schema_text = serde_json::to_string_pretty(&schema).unwrap_or_default();
	let system_prompt = "You extract recipe data from free text. \
Output must be valid JSON only and must match the provided schema exactly. \
If the ingredients are not grouped, emit a single group with an empty title. \
Use an empty string for any unknown ingredient name or amount. \
Do not add explanations or extra fields.";
	let user_prompt = format!(
		"Return JSON matching this exact schema:\n{schema_text}\nSource text:\n---\n{text}\n---"
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

fn parse_generator_json(json: Value) -> Result<Value> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Value = serde_json::from_str(content)
			.map_err(|_| eyre::eyre!("Recipe generator content is not valid JSON."))?;

		return Ok(parsed);
	}

	if json.is_object() {
		return Ok(json);
	}

	Err(eyre::eyre!("Recipe generator response is missing JSON content."))
}
