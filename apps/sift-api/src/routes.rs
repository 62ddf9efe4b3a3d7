use axum::{
	Json, Router,
	body::Body,
	extract::{Query, State},
	http::{
		HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode,
		header::{AUTHORIZATION, CONTENT_TYPE},
	},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::Serialize;
use serde_json::Value;
use subtle::ConstantTimeEq;
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};
use tracing::Instrument;

use sift_domain::SearchParams;
use sift_service::{Error, ResultItem};

use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
	let cors = cors_layer(&state.service.cfg.service.cors_allowed_origins);

	Router::new()
		.route("/search", get(search))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
		.route("/healthz", get(healthz))
		.layer(middleware::from_fn(request_id))
		.layer(TraceLayer::new_for_http())
		.layer(cors)
		.with_state(state)
}

async fn healthz() -> Json<Value> {
	Json(serde_json::json!({ "ok": true }))
}

async fn search(
	State(state): State<AppState>,
	Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ResultItem>>, ApiError> {
	let items = state
		.service
		.search(&params)
		.await
		.map_err(|err| ApiError::from_service(err, state.expose_upstream_detail()))?;

	Ok(Json(items))
}

async fn require_bearer(
	State(state): State<AppState>,
	req: Request<Body>,
	next: Next,
) -> Result<Response, ApiError> {
	let Some(expected) = state.api_auth_token() else {
		return Ok(next.run(req).await);
	};
	let authorized = read_bearer_token(req.headers())
		.is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())));

	if !authorized {
		return Err(ApiError::unauthorized());
	}

	Ok(next.run(req).await)
}

async fn request_id(req: Request<Body>, next: Next) -> Response {
	let request_id = uuid::Uuid::new_v4().to_string();
	let span = tracing::info_span!("request", request_id = %request_id);

	async move {
		let mut response = next.run(req).await;

		if let Ok(value) = HeaderValue::from_str(&request_id) {
			response.headers_mut().insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
		}

		response
	}
	.instrument(span)
	.await
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
	let wildcard = origins.iter().any(|origin| origin.trim() == "*");
	let allow_origin = if origins.is_empty() || wildcard {
		AllowOrigin::any()
	} else {
		let values = origins
			.iter()
			.filter_map(|origin| match HeaderValue::from_str(origin) {
				Ok(value) => Some(value),
				Err(_) => {
					tracing::warn!(%origin, "Ignoring invalid CORS origin.");

					None
				},
			})
			.collect::<Vec<_>>();

		AllowOrigin::list(values)
	};

	CorsLayer::new()
		.allow_methods([Method::GET])
		.allow_headers([AUTHORIZATION, CONTENT_TYPE])
		.allow_origin(allow_origin)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	detail: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error: String,
	detail: Option<String>,
}
impl ApiError {
	fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
		Self { status, error: error.into(), detail }
	}

	fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED, "Unauthorized.", None)
	}

	/// Collaborator error text is only echoed back when `expose_detail` is set.
	pub fn from_service(err: Error, expose_detail: bool) -> Self {
		let detail = expose_detail.then(|| err.to_string());

		match err {
			Error::InvalidRequest { message } => Self::new(StatusCode::BAD_REQUEST, message, None),
			Error::Configuration { message } => {
				tracing::error!(%message, "Rejected search due to server configuration.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error.", None)
			},
			Error::Upstream { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Upstream request failed.", detail),
			Error::UpstreamTimeout { .. } =>
				Self::new(StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out.", detail),
			Error::Unexpected { provider, message } => {
				tracing::error!(%provider, %message, "Search failed unexpectedly.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.", None)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error: self.error, detail: self.detail };

		(self.status, Json(body)).into_response()
	}
}
