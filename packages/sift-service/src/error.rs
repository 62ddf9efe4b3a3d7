use std::fmt::{Display, Formatter};

use sift_domain::QueryError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Outbound collaborator an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
	Dense,
	Sparse,
	Index,
}
impl Display for Provider {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Dense => f.write_str("dense embedding"),
			Self::Sparse => f.write_str("sparse embedding"),
			Self::Index => f.write_str("index"),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	InvalidRequest { message: String },
	#[error("Configuration error: {message}")]
	Configuration { message: String },
	#[error("The {provider} provider failed: {detail}")]
	Upstream { provider: Provider, status: Option<u16>, detail: String },
	#[error("The {provider} provider timed out after {timeout_ms} ms.")]
	UpstreamTimeout { provider: Provider, timeout_ms: u64 },
	#[error("Unexpected {provider} error: {message}")]
	Unexpected { provider: Provider, message: String },
}
impl Error {
	pub fn from_provider(provider: Provider, err: sift_providers::Error) -> Self {
		use sift_providers::Error as P;

		match err {
			P::Status { status, body } =>
				Self::Upstream { provider, status: Some(status), detail: body },
			P::Timeout { timeout_ms } => Self::UpstreamTimeout { provider, timeout_ms },
			P::InvalidResponse { message } => Self::Unexpected { provider, message },
			P::InvalidConfig { message } => Self::Configuration { message },
			P::InvalidHeaderName(err) => Self::Configuration { message: err.to_string() },
			P::InvalidHeaderValue(err) => Self::Configuration { message: err.to_string() },
			P::Reqwest(err) => Self::Unexpected { provider, message: err.to_string() },
			P::SerdeJson(err) => Self::Unexpected { provider, message: err.to_string() },
		}
	}
}

impl From<QueryError> for Error {
	fn from(err: QueryError) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
