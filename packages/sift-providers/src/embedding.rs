use reqwest::Client;
use serde_json::Value;

use sift_config::EmbeddingProviderConfig;

use crate::{AuthScheme, Error, Result};

/// Embeds one query text into a dense vector.
pub async fn embed(
	client: &Client,
	cfg: &EmbeddingProviderConfig,
	api_key: &str,
	text: &str,
) -> Result<Vec<f32>> {
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({ "model": cfg.model, "input": text });
	let headers = crate::auth_headers(AuthScheme::Bearer, api_key, &cfg.default_headers)?;
	let json = crate::post_json(client, url, headers, cfg.timeout_ms, &body).await?;
	let vector = parse_embedding_response(json)?.into_iter().next().ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding provider returned no vectors.".to_string() }
	})?;

	if let Some(expected) = cfg.dimensions
		&& vector.len() != expected as usize
	{
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding vector dimension mismatch: expected {expected}, got {}.",
				vector.len()
			),
		});
	}

	Ok(vector)
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding item missing embedding array.".to_string(),
			}
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
