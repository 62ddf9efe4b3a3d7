pub mod embedding;
pub mod error;
pub mod index;
pub mod sparse;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client, Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde::Serialize;
use serde_json::{Map, Value};

pub const API_KEY_HEADER: &str = "Api-Key";

const MAX_ERROR_BODY_CHARS: usize = 2_048;

/// How a provider expects its credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScheme {
	/// `Authorization: Bearer <key>`
	Bearer,
	/// `Api-Key: <key>`
	ApiKey,
}

pub fn auth_headers(
	scheme: AuthScheme,
	api_key: &str,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	match scheme {
		AuthScheme::Bearer => {
			headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
		},
		AuthScheme::ApiKey => {
			headers.insert(HeaderName::from_static("api-key"), api_key.parse()?);
		},
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// Shared client for every outbound call. Timeouts are applied per request.
pub fn http_client() -> Result<Client> {
	Ok(Client::builder().build()?)
}

pub(crate) async fn post_json<B>(
	client: &Client,
	url: String,
	headers: HeaderMap,
	timeout_ms: u64,
	body: &B,
) -> Result<Value>
where
	B: Serialize + ?Sized,
{
	let res = client
		.post(url)
		.headers(headers)
		.timeout(Duration::from_millis(timeout_ms))
		.json(body)
		.send()
		.await
		.map_err(|err| classify(err, timeout_ms))?;
	let res = ensure_success(res).await?;

	res.json().await.map_err(|err| classify(err, timeout_ms))
}

async fn ensure_success(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_success() {
		return Ok(res);
	}

	let body = res.text().await.unwrap_or_default();
	let body = body.chars().take(MAX_ERROR_BODY_CHARS).collect();

	Err(Error::Status { status: status.as_u16(), body })
}

fn classify(err: reqwest::Error, timeout_ms: u64) -> Error {
	if err.is_timeout() { Error::Timeout { timeout_ms } } else { Error::Reqwest(err) }
}
