use std::{
	future::IntoFuture,
	sync::{Arc, Mutex},
	time::Duration,
};

use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	routing,
};
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::oneshot};

use sift_config::{EmbeddingProviderConfig, IndexProviderConfig, SparseProviderConfig};
use sift_domain::{IndexQueryPayload, MetadataField, MetadataFilter, Predicate};
use sift_providers::{AuthScheme, Error, embedding, index, sparse};

#[derive(Clone, Default)]
struct Recorder {
	requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}
impl Recorder {
	fn record(&self, headers: HeaderMap, body: Value) {
		self.requests.lock().expect("Recorder lock poisoned.").push((headers, body));
	}

	fn take(&self) -> Vec<(HeaderMap, Value)> {
		std::mem::take(&mut *self.requests.lock().expect("Recorder lock poisoned."))
	}
}

async fn start_server(recorder: Recorder) -> (String, oneshot::Sender<()>) {
	let app = Router::new()
		.route("/v1/embeddings", routing::post(dense_handler))
		.route("/embed", routing::post(sparse_handler))
		.route("/query", routing::post(query_handler))
		.route("/broken", routing::post(broken_handler))
		.route("/slow", routing::post(slow_handler))
		.with_state(recorder);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind fake server.");
	let addr = listener.local_addr().expect("Failed to read fake server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

async fn dense_handler(
	State(recorder): State<Recorder>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> impl IntoResponse {
	recorder.record(headers, body);

	Json(serde_json::json!({ "data": [{ "index": 0, "embedding": [0.25, 0.5, 0.75] }] }))
}

async fn sparse_handler(
	State(recorder): State<Recorder>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> impl IntoResponse {
	recorder.record(headers, body);

	Json(serde_json::json!({
		"data": [{ "vector_type": "sparse", "sparse_indices": [5, 9], "sparse_values": [0.4, 0.2] }]
	}))
}

async fn query_handler(
	State(recorder): State<Recorder>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> impl IntoResponse {
	recorder.record(headers, body);

	Json(serde_json::json!({
		"matches": [
			{ "id": "doc-1", "score": 0.9, "metadata": { "title": "On Schools" } },
			{ "id": "doc-2", "score": 0.7 }
		]
	}))
}

async fn broken_handler() -> impl IntoResponse {
	(StatusCode::UNAUTHORIZED, "invalid api key")
}

async fn slow_handler() -> impl IntoResponse {
	tokio::time::sleep(Duration::from_millis(1_000)).await;

	Json(serde_json::json!({ "data": [] }))
}

fn dense_config(api_base: &str, path: &str, timeout_ms: u64) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		api_base: api_base.to_string(),
		path: path.to_string(),
		api_key: Some("dense-key".to_string()),
		model: "text-embedding-3-small".to_string(),
		dimensions: Some(3),
		timeout_ms,
		default_headers: Map::new(),
	}
}

fn sparse_config(api_base: &str) -> SparseProviderConfig {
	let mut default_headers = Map::new();

	default_headers.insert("X-Pinecone-API-Version".to_string(), Value::from("2025-01"));

	SparseProviderConfig {
		api_base: api_base.to_string(),
		path: "/embed".to_string(),
		api_key: Some("index-key".to_string()),
		model: "pinecone-sparse-english-v0".to_string(),
		timeout_ms: 2_000,
		default_headers,
	}
}

fn index_config() -> IndexProviderConfig {
	IndexProviderConfig {
		api_base: None,
		path: "/query".to_string(),
		api_key: Some("index-key".to_string()),
		namespace: None,
		timeout_ms: 2_000,
		default_headers: Map::new(),
	}
}

#[test]
fn builds_bearer_auth_header() {
	let headers = sift_providers::auth_headers(AuthScheme::Bearer, "secret", &Map::new())
		.expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn builds_api_key_header_with_defaults() {
	let mut defaults = Map::new();

	defaults.insert("X-Pinecone-API-Version".to_string(), Value::from("2025-01"));

	let headers = sift_providers::auth_headers(AuthScheme::ApiKey, "secret", &defaults)
		.expect("Failed to build headers.");

	assert_eq!(headers.get(sift_providers::API_KEY_HEADER).expect("Missing Api-Key."), "secret");
	assert_eq!(headers.get("x-pinecone-api-version").expect("Missing version."), "2025-01");
	assert!(headers.get(AUTHORIZATION).is_none());
}

#[test]
fn non_string_default_header_is_rejected() {
	let mut defaults = Map::new();

	defaults.insert("X-Retries".to_string(), Value::from(3));

	let err = sift_providers::auth_headers(AuthScheme::Bearer, "secret", &defaults)
		.expect_err("Expected invalid config.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn dense_embedding_posts_model_and_input() {
	let recorder = Recorder::default();
	let (api_base, shutdown) = start_server(recorder.clone()).await;
	let client = sift_providers::http_client().expect("Failed to build client.");
	let cfg = dense_config(&api_base, "/v1/embeddings", 2_000);
	let vector =
		embedding::embed(&client, &cfg, "dense-key", "education").await.expect("Embed failed.");
	let requests = recorder.take();
	let _ = shutdown.send(());

	assert_eq!(vector, vec![0.25, 0.5, 0.75]);
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].0.get(AUTHORIZATION).expect("Missing auth."), "Bearer dense-key");
	assert_eq!(
		requests[0].1,
		serde_json::json!({ "model": "text-embedding-3-small", "input": "education" })
	);
}

#[tokio::test]
async fn dense_embedding_rejects_wrong_dimensions() {
	let recorder = Recorder::default();
	let (api_base, shutdown) = start_server(recorder).await;
	let client = sift_providers::http_client().expect("Failed to build client.");
	let mut cfg = dense_config(&api_base, "/v1/embeddings", 2_000);

	cfg.dimensions = Some(1_536);

	let err = embedding::embed(&client, &cfg, "dense-key", "education")
		.await
		.expect_err("Expected dimension mismatch.");
	let _ = shutdown.send(());

	assert!(matches!(err, Error::InvalidResponse { .. }), "Unexpected error: {err}");
}

#[tokio::test]
async fn sparse_embedding_uses_query_input_type() {
	let recorder = Recorder::default();
	let (api_base, shutdown) = start_server(recorder.clone()).await;
	let client = sift_providers::http_client().expect("Failed to build client.");
	let cfg = sparse_config(&api_base);
	let vector = sparse::embed_sparse(&client, &cfg, "index-key", " growth mindset ")
		.await
		.expect("Sparse embed failed.");
	let requests = recorder.take();
	let _ = shutdown.send(());

	assert_eq!(vector.indices, vec![5, 9]);
	assert_eq!(vector.values, vec![0.4, 0.2]);
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].0.get("api-key").expect("Missing Api-Key."), "index-key");
	assert_eq!(
		requests[0].1,
		serde_json::json!({
			"model": "pinecone-sparse-english-v0",
			"parameters": { "input_type": "query" },
			"inputs": [{ "text": "growth mindset" }],
		})
	);
}

#[tokio::test]
async fn blank_sparse_input_skips_the_provider() {
	let recorder = Recorder::default();
	let (api_base, shutdown) = start_server(recorder.clone()).await;
	let client = sift_providers::http_client().expect("Failed to build client.");
	let vector = sparse::embed_sparse(&client, &sparse_config(&api_base), "index-key", "  ")
		.await
		.expect("Blank input must not fail.");
	let requests = recorder.take();
	let _ = shutdown.send(());

	assert!(vector.is_empty());
	assert!(requests.is_empty());
}

#[tokio::test]
async fn index_query_posts_camel_case_payload() {
	let recorder = Recorder::default();
	let (api_base, shutdown) = start_server(recorder.clone()).await;
	let client = sift_providers::http_client().expect("Failed to build client.");
	let mut filter = MetadataFilter::new();

	filter.insert(MetadataField::FinalType, Predicate::in_set(["Essay"]));

	let payload = IndexQueryPayload {
		vector: vec![0.5, 0.5],
		sparse_vector: None,
		top_k: 5,
		filter: Some(filter),
		namespace: Some("essays".to_string()),
		include_metadata: true,
	};
	let matches = index::query(&client, &index_config(), &api_base, "index-key", &payload)
		.await
		.expect("Query failed.");
	let requests = recorder.take();
	let _ = shutdown.send(());

	assert_eq!(matches.len(), 2);
	assert_eq!(matches[0].id, "doc-1");
	assert!(matches[1].metadata.is_empty());
	assert_eq!(
		requests[0].1,
		serde_json::json!({
			"vector": [0.5, 0.5],
			"topK": 5,
			"filter": { "final_type": { "$in": ["Essay"] } },
			"namespace": "essays",
			"includeMetadata": true,
		})
	);
}

#[tokio::test]
async fn non_success_status_carries_provider_body() {
	let recorder = Recorder::default();
	let (api_base, shutdown) = start_server(recorder).await;
	let client = sift_providers::http_client().expect("Failed to build client.");
	let cfg = dense_config(&api_base, "/broken", 2_000);
	let err = embedding::embed(&client, &cfg, "dense-key", "education")
		.await
		.expect_err("Expected status error.");
	let _ = shutdown.send(());

	match err {
		Error::Status { status, body } => {
			assert_eq!(status, 401);
			assert_eq!(body, "invalid api key");
		},
		other => panic!("Unexpected error: {other}"),
	}
}

#[tokio::test]
async fn slow_provider_times_out() {
	let recorder = Recorder::default();
	let (api_base, shutdown) = start_server(recorder).await;
	let client = sift_providers::http_client().expect("Failed to build client.");
	let cfg = dense_config(&api_base, "/slow", 50);
	let err = embedding::embed(&client, &cfg, "dense-key", "education")
		.await
		.expect_err("Expected timeout.");
	let _ = shutdown.send(());

	assert!(matches!(err, Error::Timeout { timeout_ms: 50 }), "Unexpected error: {err}");
}
