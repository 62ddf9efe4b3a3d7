use serde::Serialize;
use time::Date;

use sift_config::RecencyStrategy;

use crate::{
	filter::MetadataFilter,
	hybrid::{self, SparseVector},
	query::QueryRequest,
	recency,
};

/// Body of an index similarity query.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQueryPayload {
	pub vector: Vec<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sparse_vector: Option<SparseVector>,
	pub top_k: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub filter: Option<MetadataFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub namespace: Option<String>,
	pub include_metadata: bool,
}

/// Translates the query's facets into a metadata filter. `today` is the current UTC date.
pub fn build_filter(
	query: &QueryRequest,
	recency: RecencyStrategy,
	today: Date,
) -> MetadataFilter {
	let mut filter = MetadataFilter::new();

	if let Some((field, predicate)) = query.content_type.predicate() {
		filter.insert(field, predicate);
	}
	if let Some(days) = query.recency_days {
		let (field, predicate) = recency::predicate(recency, today, days);

		filter.insert(field, predicate);
	}

	filter
}

pub fn build_payload(
	query: &QueryRequest,
	filter: MetadataFilter,
	dense: Vec<f32>,
	sparse: Option<SparseVector>,
	namespace: Option<&str>,
) -> IndexQueryPayload {
	let (vector, sparse_vector) = hybrid::blend(dense, sparse, query.alpha);

	IndexQueryPayload {
		vector,
		sparse_vector,
		top_k: query.result_limit,
		filter: filter.into_option(),
		namespace: namespace.map(str::to_string),
		include_metadata: true,
	}
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::*;
	use crate::content_type::ContentTypeFilter;

	fn query() -> QueryRequest {
		QueryRequest {
			text: "education".to_string(),
			result_limit: 5,
			content_type: ContentTypeFilter::All,
			recency_days: None,
			exact_phrase: None,
			alpha: 0.8,
		}
	}

	#[test]
	fn bare_payload_omits_optional_fields() {
		let payload = build_payload(&query(), MetadataFilter::new(), vec![0.1, 0.2], None, None);

		assert_eq!(
			serde_json::to_value(&payload).expect("payload serializes"),
			serde_json::json!({ "vector": [0.1_f32, 0.2_f32], "topK": 5, "includeMetadata": true })
		);
	}

	#[test]
	fn sparse_payload_uses_camel_case() {
		let sparse = SparseVector { indices: vec![3], values: vec![1.0] };
		let payload =
			build_payload(&query(), MetadataFilter::new(), vec![1.0], Some(sparse), Some("essays"));
		let value = serde_json::to_value(&payload).expect("payload serializes");

		assert_eq!(value["sparseVector"], serde_json::json!({ "indices": [3], "values": [1.0] }));
		assert_eq!(value["vector"], serde_json::json!([0.8_f32]));
		assert_eq!(value["namespace"], "essays");
	}

	#[test]
	fn filter_combines_type_and_recency() {
		let query = QueryRequest {
			content_type: ContentTypeFilter::parse_tokens("essay"),
			recency_days: Some(7),
			..query()
		};
		let filter = build_filter(&query, RecencyStrategy::Gte, date!(2026 - 10 - 18));

		assert_eq!(
			filter.to_value(),
			serde_json::json!({
				"final_type": { "$in": ["Essay"] },
				"date": { "$gte": "2026-10-11" },
			})
		);
	}
}
