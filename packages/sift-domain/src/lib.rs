//! Request normalization and filter translation for the search proxy.
//!
//! Nothing here performs I/O. The service crate feeds these functions the request parameters,
//! the configured modes, and today's date, then ships the resulting payload to the index.

pub mod content_type;
pub mod filter;
pub mod hybrid;
pub mod payload;
pub mod query;
pub mod recency;

pub use content_type::{ContentKind, ContentTypeFilter};
pub use filter::{MetadataField, MetadataFilter, Predicate};
pub use hybrid::SparseVector;
pub use payload::{IndexQueryPayload, build_filter, build_payload};
pub use query::{QueryBuilder, QueryError, QueryRequest, SearchParams};
