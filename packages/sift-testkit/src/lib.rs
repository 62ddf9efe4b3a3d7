//! Shared fixtures for service and HTTP tests: an in-memory configuration and recording
//! stand-ins for every outbound collaborator.

use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use serde_json::{Map, Value};

use sift_config::{
	Config, EmbeddingProviderConfig, Hybrid, IndexProviderConfig, Providers as ProviderConfigs,
	Search, Security, Service, SparseProviderConfig,
};
use sift_domain::{IndexQueryPayload, SparseVector};
use sift_providers::index::IndexMatch;
use sift_service::{
	BoxFuture, DenseEmbeddingProvider, IndexProvider, Providers, SiftService,
	SparseEmbeddingProvider,
};

pub const DENSE_DIMS: usize = 4;

/// How a stand-in provider fails. Rebuilt into a fresh provider error on every call.
#[derive(Clone, Debug)]
pub enum Failure {
	Status { status: u16, body: String },
	Timeout { timeout_ms: u64 },
	Malformed { message: String },
}
impl Failure {
	fn to_error(&self) -> sift_providers::Error {
		match self {
			Self::Status { status, body } =>
				sift_providers::Error::Status { status: *status, body: body.clone() },
			Self::Timeout { timeout_ms } =>
				sift_providers::Error::Timeout { timeout_ms: *timeout_ms },
			Self::Malformed { message } =>
				sift_providers::Error::InvalidResponse { message: message.clone() },
		}
	}
}

pub struct SpyDense {
	calls: AtomicUsize,
	texts: Mutex<Vec<String>>,
	reply: Result<Vec<f32>, Failure>,
}
impl SpyDense {
	pub fn returning(vector: Vec<f32>) -> Self {
		Self { calls: AtomicUsize::new(0), texts: Mutex::new(Vec::new()), reply: Ok(vector) }
	}

	pub fn failing(failure: Failure) -> Self {
		Self { calls: AtomicUsize::new(0), texts: Mutex::new(Vec::new()), reply: Err(failure) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn texts(&self) -> Vec<String> {
		self.texts.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl DenseEmbeddingProvider for SpyDense {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_api_key: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.texts.lock().unwrap_or_else(|err| err.into_inner()).push(text.to_string());

		let reply = self.reply.clone().map_err(|failure| failure.to_error());

		Box::pin(async move { reply })
	}
}

pub struct SpySparse {
	calls: AtomicUsize,
	texts: Mutex<Vec<String>>,
	reply: Result<SparseVector, Failure>,
}
impl SpySparse {
	pub fn returning(vector: SparseVector) -> Self {
		Self { calls: AtomicUsize::new(0), texts: Mutex::new(Vec::new()), reply: Ok(vector) }
	}

	pub fn failing(failure: Failure) -> Self {
		Self { calls: AtomicUsize::new(0), texts: Mutex::new(Vec::new()), reply: Err(failure) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn texts(&self) -> Vec<String> {
		self.texts.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl SparseEmbeddingProvider for SpySparse {
	fn embed_sparse<'a>(
		&'a self,
		_cfg: &'a SparseProviderConfig,
		_api_key: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<SparseVector>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.texts.lock().unwrap_or_else(|err| err.into_inner()).push(text.to_string());

		let reply = self.reply.clone().map_err(|failure| failure.to_error());

		Box::pin(async move { reply })
	}
}

pub struct SpyIndex {
	payloads: Mutex<Vec<IndexQueryPayload>>,
	reply: Result<Vec<IndexMatch>, Failure>,
}
impl SpyIndex {
	pub fn returning(matches: Vec<IndexMatch>) -> Self {
		Self { payloads: Mutex::new(Vec::new()), reply: Ok(matches) }
	}

	pub fn failing(failure: Failure) -> Self {
		Self { payloads: Mutex::new(Vec::new()), reply: Err(failure) }
	}

	pub fn count(&self) -> usize {
		self.payloads.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn last_payload(&self) -> Option<IndexQueryPayload> {
		self.payloads.lock().unwrap_or_else(|err| err.into_inner()).last().cloned()
	}
}
impl IndexProvider for SpyIndex {
	fn query<'a>(
		&'a self,
		_cfg: &'a IndexProviderConfig,
		_api_base: &'a str,
		_api_key: &'a str,
		payload: &'a IndexQueryPayload,
	) -> BoxFuture<'a, sift_providers::Result<Vec<IndexMatch>>> {
		self.payloads.lock().unwrap_or_else(|err| err.into_inner()).push(payload.clone());

		let reply = self.reply.clone().map_err(|failure| failure.to_error());

		Box::pin(async move { reply })
	}
}

/// One set of stand-ins wired into [`Providers`], with handles kept for assertions.
pub struct Spies {
	pub dense: Arc<SpyDense>,
	pub sparse: Arc<SpySparse>,
	pub index: Arc<SpyIndex>,
}
impl Spies {
	/// Unit dense vector, a two-term sparse vector, and `hits` numbered matches.
	pub fn new(hits: usize) -> Self {
		Self::with(
			SpyDense::returning(vec![1.0; DENSE_DIMS]),
			SpySparse::returning(SparseVector { indices: vec![3, 17], values: vec![0.6, 0.3] }),
			SpyIndex::returning(sample_matches(hits)),
		)
	}

	pub fn with(dense: SpyDense, sparse: SpySparse, index: SpyIndex) -> Self {
		Self { dense: Arc::new(dense), sparse: Arc::new(sparse), index: Arc::new(index) }
	}

	pub fn providers(&self) -> Providers {
		Providers::new(self.dense.clone(), self.sparse.clone(), self.index.clone())
	}

	pub fn service(&self, cfg: Config) -> SiftService {
		SiftService::with_providers(cfg, self.providers())
	}

	/// Total outbound calls across all three collaborators.
	pub fn upstream_calls(&self) -> usize {
		self.dense.count() + self.sparse.count() + self.index.count()
	}
}

pub fn sample_matches(count: usize) -> Vec<IndexMatch> {
	(0..count)
		.map(|i| {
			let mut metadata = Map::new();

			metadata.insert("title".to_string(), Value::from(format!("Essay {i}")));
			metadata.insert("final_type".to_string(), Value::from("Essay"));
			metadata.insert("date".to_string(), Value::from("2026-10-15"));
			metadata.insert("snippet".to_string(), Value::from("Schools teach..."));

			IndexMatch { id: format!("doc-{i}"), score: 1.0 - i as f64 * 0.01, metadata }
		})
		.collect()
}

/// Fully credentialed configuration with hybrid search off and defaults elsewhere.
pub fn test_config() -> Config {
	let mut pinecone_headers = Map::new();

	pinecone_headers.insert("X-Pinecone-API-Version".to_string(), Value::from("2025-01"));

	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			cors_allowed_origins: Vec::new(),
		},
		security: Security::default(),
		search: Search::default(),
		hybrid: Hybrid::default(),
		providers: ProviderConfigs {
			embedding: EmbeddingProviderConfig {
				api_base: "http://embedding.test".to_string(),
				path: "/v1/embeddings".to_string(),
				api_key: Some("embedding-key".to_string()),
				model: "text-embedding-3-small".to_string(),
				dimensions: Some(DENSE_DIMS as u32),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			sparse: Some(SparseProviderConfig {
				api_base: "http://sparse.test".to_string(),
				path: "/embed".to_string(),
				api_key: Some("index-key".to_string()),
				model: "pinecone-sparse-english-v0".to_string(),
				timeout_ms: 1_000,
				default_headers: pinecone_headers.clone(),
			}),
			index: IndexProviderConfig {
				api_base: Some("http://index.test".to_string()),
				path: "/query".to_string(),
				api_key: Some("index-key".to_string()),
				namespace: None,
				timeout_ms: 1_000,
				default_headers: pinecone_headers,
			},
		},
	}
}
