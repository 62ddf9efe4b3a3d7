use reqwest::Client;
use serde_json::Value;

use sift_config::SparseProviderConfig;
use sift_domain::SparseVector;

use crate::{AuthScheme, Error, Result};

/// Embeds an exact phrase into a sparse lexical vector.
///
/// Blank input yields an empty vector without contacting the provider.
pub async fn embed_sparse(
	client: &Client,
	cfg: &SparseProviderConfig,
	api_key: &str,
	text: &str,
) -> Result<SparseVector> {
	let text = text.trim();

	if text.is_empty() {
		return Ok(SparseVector::default());
	}

	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"parameters": { "input_type": "query" },
		"inputs": [{ "text": text }],
	});
	let headers = crate::auth_headers(AuthScheme::ApiKey, api_key, &cfg.default_headers)?;
	let json = crate::post_json(client, url, headers, cfg.timeout_ms, &body).await?;

	parse_sparse_response(&json)
}

fn parse_sparse_response(json: &Value) -> Result<SparseVector> {
	let item = json
		.get("data")
		.and_then(Value::as_array)
		.and_then(|data| data.first())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Sparse embedding response is missing data.".to_string(),
		})?;
	let indices = item
		.get("sparse_indices")
		.or_else(|| item.get("indices"))
		.and_then(Value::as_array)
		.map(|values| {
			values
				.iter()
				.map(|v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
				.collect::<Option<Vec<_>>>()
		})
		.unwrap_or_else(|| Some(Vec::new()))
		.ok_or_else(|| Error::InvalidResponse {
			message: "Sparse indices must be unsigned 32-bit integers.".to_string(),
		})?;
	let values = item
		.get("sparse_values")
		.or_else(|| item.get("values"))
		.and_then(Value::as_array)
		.map(|values| {
			values.iter().map(|v| v.as_f64().map(|n| n as f32)).collect::<Option<Vec<_>>>()
		})
		.unwrap_or_else(|| Some(Vec::new()))
		.ok_or_else(|| Error::InvalidResponse {
			message: "Sparse values must be numeric.".to_string(),
		})?;

	if indices.len() != values.len() {
		return Err(Error::InvalidResponse {
			message: format!(
				"Sparse vector has {} indices but {} values.",
				indices.len(),
				values.len()
			),
		});
	}

	Ok(SparseVector { indices, values })
}
