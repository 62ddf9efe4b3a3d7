use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use sift_config::IndexProviderConfig;
use sift_domain::IndexQueryPayload;

use crate::{AuthScheme, Error, Result};

/// One scored hit from the index. Metadata is passed through untouched.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct IndexMatch {
	pub id: String,
	pub score: f64,
	#[serde(default, deserialize_with = "null_as_empty")]
	pub metadata: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
	#[serde(default)]
	matches: Vec<IndexMatch>,
}

/// Runs a similarity query. `api_base` is the resolved index host.
pub async fn query(
	client: &Client,
	cfg: &IndexProviderConfig,
	api_base: &str,
	api_key: &str,
	payload: &IndexQueryPayload,
) -> Result<Vec<IndexMatch>> {
	let url = format!("{api_base}{}", cfg.path);
	let headers = crate::auth_headers(AuthScheme::ApiKey, api_key, &cfg.default_headers)?;
	let json = crate::post_json(client, url, headers, cfg.timeout_ms, payload).await?;

	parse_query_response(json)
}

fn parse_query_response(json: Value) -> Result<Vec<IndexMatch>> {
	if !json.is_object() {
		return Err(Error::InvalidResponse {
			message: "Index query response must be a JSON object.".to_string(),
		});
	}

	let response: QueryResponse = serde_json::from_value(json)?;

	Ok(response.matches)
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
