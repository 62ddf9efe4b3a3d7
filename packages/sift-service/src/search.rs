use time::{Date, OffsetDateTime};

use sift_config::SparseProviderConfig;
use sift_domain::{QueryBuilder, SearchParams, SparseVector, build_filter, build_payload, hybrid};

use crate::{Error, Provider, Result, ResultItem, SiftService};

/// Credentials and endpoints resolved before any outbound call.
struct Upstreams<'a> {
	embedding_key: &'a str,
	index_key: &'a str,
	index_host: &'a str,
	sparse: Option<(&'a SparseProviderConfig, &'a str)>,
}

impl SiftService {
	pub async fn search(&self, params: &SearchParams) -> Result<Vec<ResultItem>> {
		self.search_at(params, OffsetDateTime::now_utc().date()).await
	}

	/// Runs one search with `today` as the reference date for recency windows.
	pub async fn search_at(&self, params: &SearchParams, today: Date) -> Result<Vec<ResultItem>> {
		let query = QueryBuilder::new(&self.cfg.search, &self.cfg.hybrid).build(params)?;
		let use_sparse =
			hybrid::wants_sparse(self.cfg.hybrid.enabled, query.exact_phrase.as_deref());
		let upstreams = self.upstreams(use_sparse).inspect_err(|err| {
			tracing::error!(error = %err, "Search is misconfigured.");
		})?;
		let filter = build_filter(&query, self.cfg.search.recency_strategy, today);

		tracing::debug!(
			top_k = query.result_limit,
			filter = %filter.to_value(),
			use_sparse,
			alpha = query.alpha,
			"Translated search request."
		);

		let providers = &self.cfg.providers;
		let dense = async {
			self.providers
				.dense
				.embed(&providers.embedding, upstreams.embedding_key, &query.text)
				.await
				.map_err(|err| upstream_error(Provider::Dense, err))
		};
		let sparse = async {
			let (Some((cfg, api_key)), Some(phrase)) =
				(upstreams.sparse, query.exact_phrase.as_deref())
			else {
				return Ok(None::<SparseVector>);
			};

			self.providers
				.sparse
				.embed_sparse(cfg, api_key, phrase)
				.await
				.map(Some)
				.map_err(|err| upstream_error(Provider::Sparse, err))
		};
		let (dense, sparse) = tokio::try_join!(dense, sparse)?;

		tracing::debug!(
			dense_dims = dense.len(),
			sparse_terms = sparse.as_ref().map_or(0, |sparse| sparse.indices.len()),
			"Embedded search text."
		);

		let payload =
			build_payload(&query, filter, dense, sparse, providers.index.namespace.as_deref());
		let matches = self
			.providers
			.index
			.query(&providers.index, upstreams.index_host, upstreams.index_key, &payload)
			.await
			.map_err(|err| upstream_error(Provider::Index, err))?;

		tracing::debug!(matches = matches.len(), "Index query finished.");

		Ok(matches.into_iter().take(query.result_limit as usize).map(ResultItem::from).collect())
	}

	fn upstreams(&self, use_sparse: bool) -> Result<Upstreams<'_>> {
		let providers = &self.cfg.providers;
		let embedding_key = required(providers.embedding.api_key.as_deref(), "embedding API key")?;
		let index_key = required(providers.index.api_key.as_deref(), "index API key")?;
		let index_host = required(providers.index.api_base.as_deref(), "index host")?;
		let sparse = if use_sparse {
			let cfg = providers.sparse.as_ref().ok_or_else(|| Error::Configuration {
				message: "Hybrid search is enabled without a sparse provider.".to_string(),
			})?;
			let api_key = required(cfg.api_key.as_deref(), "sparse embedding API key")?;

			Some((cfg, api_key))
		} else {
			None
		};

		Ok(Upstreams { embedding_key, index_key, index_host, sparse })
	}
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str> {
	value
		.filter(|value| !value.trim().is_empty())
		.ok_or_else(|| Error::Configuration { message: format!("The {what} is not configured.") })
}

fn upstream_error(provider: Provider, err: sift_providers::Error) -> Error {
	let err = Error::from_provider(provider, err);

	tracing::warn!(%provider, error = %err, "Upstream call failed.");

	err
}
