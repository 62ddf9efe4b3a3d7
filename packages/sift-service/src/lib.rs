pub mod error;
pub mod result;
pub mod search;

pub use error::{Error, Provider, Result};
pub use result::ResultItem;

use std::{future::Future, pin::Pin, sync::Arc};

use reqwest::Client;

use sift_config::{Config, EmbeddingProviderConfig, IndexProviderConfig, SparseProviderConfig};
use sift_domain::{IndexQueryPayload, SparseVector};
use sift_providers::{embedding, index, index::IndexMatch, sparse};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait DenseEmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		api_key: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<Vec<f32>>>;
}

pub trait SparseEmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_sparse<'a>(
		&'a self,
		cfg: &'a SparseProviderConfig,
		api_key: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<SparseVector>>;
}

pub trait IndexProvider
where
	Self: Send + Sync,
{
	fn query<'a>(
		&'a self,
		cfg: &'a IndexProviderConfig,
		api_base: &'a str,
		api_key: &'a str,
		payload: &'a IndexQueryPayload,
	) -> BoxFuture<'a, sift_providers::Result<Vec<IndexMatch>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub dense: Arc<dyn DenseEmbeddingProvider>,
	pub sparse: Arc<dyn SparseEmbeddingProvider>,
	pub index: Arc<dyn IndexProvider>,
}
impl Providers {
	pub fn new(
		dense: Arc<dyn DenseEmbeddingProvider>,
		sparse: Arc<dyn SparseEmbeddingProvider>,
		index: Arc<dyn IndexProvider>,
	) -> Self {
		Self { dense, sparse, index }
	}

	/// Real HTTP collaborators sharing one connection pool.
	pub fn http() -> sift_providers::Result<Self> {
		let provider = Arc::new(HttpProviders { client: sift_providers::http_client()? });

		Ok(Self { dense: provider.clone(), sparse: provider.clone(), index: provider })
	}
}

pub struct SiftService {
	pub cfg: Config,
	pub providers: Providers,
}
impl SiftService {
	pub fn new(cfg: Config) -> Result<Self> {
		let providers = Providers::http()
			.map_err(|err| Error::Configuration { message: err.to_string() })?;

		Ok(Self { cfg, providers })
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}

struct HttpProviders {
	client: Client,
}

impl DenseEmbeddingProvider for HttpProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		api_key: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<Vec<f32>>> {
		Box::pin(embedding::embed(&self.client, cfg, api_key, text))
	}
}

impl SparseEmbeddingProvider for HttpProviders {
	fn embed_sparse<'a>(
		&'a self,
		cfg: &'a SparseProviderConfig,
		api_key: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<SparseVector>> {
		Box::pin(sparse::embed_sparse(&self.client, cfg, api_key, text))
	}
}

impl IndexProvider for HttpProviders {
	fn query<'a>(
		&'a self,
		cfg: &'a IndexProviderConfig,
		api_base: &'a str,
		api_key: &'a str,
		payload: &'a IndexQueryPayload,
	) -> BoxFuture<'a, sift_providers::Result<Vec<IndexMatch>>> {
		Box::pin(index::query(&self.client, cfg, api_base, api_key, payload))
	}
}
