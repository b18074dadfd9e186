use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You break a task into concrete subtasks. Respond with a JSON array \
of short subtask title strings and nothing else.";

/// Asks the suggestion model to break a task title into subtask titles.
/// The model occasionally wraps its JSON in prose, so the call is retried a
/// few times before giving up.
pub async fn suggest_subtasks(
	cfg: &taskdeck_config::SuggestionProviderConfig,
	task_title: &str,
) -> Result<Vec<String>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);

	for _ in 0..3 {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": [
				{ "role": "system", "content": SYSTEM_PROMPT },
				{ "role": "user", "content": task_title },
			],
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		if let Ok(suggestions) = parse_suggestions(&json, cfg.max_suggestions as usize) {
			return Ok(suggestions);
		}
	}

	Err(eyre::eyre!("Suggestion response is not a JSON array of strings."))
}

fn parse_suggestions(json: &Value, max_suggestions: usize) -> Result<Vec<String>> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(|content| content.as_str())
		.ok_or_else(|| eyre::eyre!("Suggestion response has no message content."))?;
	let trimmed = content.trim().trim_start_matches("```json").trim_matches('`').trim();
	let parsed: Value = serde_json::from_str(trimmed)
		.map_err(|err| eyre::eyre!("Suggestion content is not valid JSON: {err}."))?;
	let items = parsed
		.as_array()
		.ok_or_else(|| eyre::eyre!("Suggestion content is not a JSON array."))?;
	let mut suggestions = Vec::new();

	for item in items {
		let Some(text) = item.as_str() else {
			return Err(eyre::eyre!("Suggestion entries must be strings."));
		};
		let text = text.trim();

		if text.is_empty() {
			continue;
		}

		suggestions.push(text.to_string());

		if suggestions.len() == max_suggestions {
			break;
		}
	}

	Ok(suggestions)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chat_response(content: &str) -> Value {
		serde_json::json!({
			"choices": [{ "message": { "role": "assistant", "content": content } }]
		})
	}

	#[test]
	fn parses_plain_json_array() {
		let json = chat_response(r#"["Buy 2% milk", "Check the fridge"]"#);
		let parsed = parse_suggestions(&json, 5).expect("parse failed");

		assert_eq!(parsed, vec!["Buy 2% milk".to_string(), "Check the fridge".to_string()]);
	}

	#[test]
	fn strips_code_fences_and_blank_entries() {
		let json = chat_response("```json\n[\"One\", \"  \", \"Two\"]\n```");
		let parsed = parse_suggestions(&json, 5).expect("parse failed");

		assert_eq!(parsed, vec!["One".to_string(), "Two".to_string()]);
	}

	#[test]
	fn truncates_to_the_configured_maximum() {
		let json = chat_response(r#"["a", "b", "c", "d"]"#);
		let parsed = parse_suggestions(&json, 2).expect("parse failed");

		assert_eq!(parsed.len(), 2);
	}

	#[test]
	fn prose_content_is_an_error() {
		let json = chat_response("Here are some subtasks you could try.");

		assert!(parse_suggestions(&json, 5).is_err());
	}

	#[test]
	fn empty_array_is_allowed() {
		let json = chat_response("[]");

		assert_eq!(parse_suggestions(&json, 5).expect("parse failed"), Vec::<String>::new());
	}
}
