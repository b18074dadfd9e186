use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Calls the embedding endpoint with a batch of texts and returns one
/// vector per input, in input order.
pub async fn embed(
	cfg: &taskdeck_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json)
}

/// Convenience wrapper for the single-text case (task titles and search
/// queries are always embedded one at a time).
pub async fn embed_one(
	cfg: &taskdeck_config::EmbeddingProviderConfig,
	text: &str,
) -> Result<Vec<f32>> {
	let vectors = embed(cfg, std::slice::from_ref(&text.to_string())).await?;

	vectors
		.into_iter()
		.next()
		.ok_or_else(|| eyre::eyre!("Embedding endpoint returned no vectors."))
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Embedding response is missing its data array."))?;
	let mut indexed = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let values = item
			.get("embedding")
			.and_then(|v| v.as_array())
			.ok_or_else(|| eyre::eyre!("Embedding item is missing its embedding array."))?;
		let mut vec = Vec::with_capacity(values.len());

		for value in values {
			let number = value
				.as_f64()
				.ok_or_else(|| eyre::eyre!("Embedding values must be numeric."))?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
