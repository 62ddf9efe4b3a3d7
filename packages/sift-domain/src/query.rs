use serde::Deserialize;

use sift_config::{Hybrid, Search};

use crate::content_type::ContentTypeFilter;

pub const MISSING_QUERY: &str = "Missing q";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
	#[error("Missing q")]
	MissingText,
}

/// Raw `/search` query-string parameters. Everything stays textual so malformed numbers fall
/// back to defaults instead of rejecting the request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchParams {
	pub q: Option<String>,
	#[serde(rename = "topK")]
	pub top_k: Option<String>,
	#[serde(rename = "type")]
	pub content_type: Option<String>,
	pub days: Option<String>,
	pub alpha: Option<String>,
	pub exact: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryRequest {
	pub text: String,
	pub result_limit: u32,
	pub content_type: ContentTypeFilter,
	pub recency_days: Option<u32>,
	pub exact_phrase: Option<String>,
	pub alpha: f32,
}

/// Validates and normalizes [`SearchParams`] against the deployment's search settings.
pub struct QueryBuilder<'a> {
	search: &'a Search,
	hybrid: &'a Hybrid,
}
impl<'a> QueryBuilder<'a> {
	pub fn new(search: &'a Search, hybrid: &'a Hybrid) -> Self {
		Self { search, hybrid }
	}

	pub fn build(&self, params: &SearchParams) -> Result<QueryRequest, QueryError> {
		let text = params
			.q
			.as_deref()
			.map(str::trim)
			.filter(|text| !text.is_empty())
			.ok_or(QueryError::MissingText)?;

		Ok(QueryRequest {
			text: text.to_string(),
			result_limit: self.result_limit(params.top_k.as_deref()),
			content_type: ContentTypeFilter::parse(
				self.search.content_type_mode,
				params.content_type.as_deref(),
			),
			recency_days: self.recency_days(params.days.as_deref()),
			exact_phrase: params
				.exact
				.as_deref()
				.map(str::trim)
				.filter(|phrase| !phrase.is_empty())
				.map(str::to_string),
			alpha: self.alpha(params.alpha.as_deref()),
		})
	}

	/// Reads the leading integer, so `5.0` and `5abc` mean 5. Zero, negative, and non-numeric
	/// values fall back to the default; the rest clamp to the ceiling, however many digits.
	pub fn result_limit(&self, raw: Option<&str>) -> u32 {
		let max = self.search.max_top_k.max(1);
		let default = self.search.default_top_k.clamp(1, max);
		let raw = raw.map(str::trim).unwrap_or_default();

		if raw.starts_with('-') {
			return default;
		}

		let unsigned = raw.strip_prefix('+').unwrap_or(raw);
		let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();

		if digits == 0 {
			return default;
		}

		match unsigned[..digits].parse::<u32>().unwrap_or(u32::MAX) {
			0 => default,
			requested => requested.min(max),
		}
	}

	/// Accepts finite values of at least one day, truncating fractions and capping at
	/// `max_recency_days`.
	pub fn recency_days(&self, raw: Option<&str>) -> Option<u32> {
		let days = raw?.trim().parse::<f64>().ok()?;

		if !days.is_finite() || days < 1.0 {
			return None;
		}

		let capped = days.trunc().min(f64::from(self.search.max_recency_days));

		Some(capped as u32)
	}

	pub fn alpha(&self, raw: Option<&str>) -> f32 {
		raw.and_then(|raw| raw.trim().parse::<f32>().ok())
			.filter(|alpha| alpha.is_finite())
			.map(|alpha| alpha.clamp(0.0, 1.0))
			.unwrap_or(self.hybrid.default_alpha)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn search() -> Search {
		Search::default()
	}

	#[test]
	fn missing_or_blank_text_is_rejected() {
		let search = search();
		let hybrid = Hybrid::default();
		let builder = QueryBuilder::new(&search, &hybrid);

		assert_eq!(builder.build(&SearchParams::default()), Err(QueryError::MissingText));
		assert_eq!(
			builder.build(&SearchParams { q: Some("   ".to_string()), ..Default::default() }),
			Err(QueryError::MissingText)
		);
		assert_eq!(QueryError::MissingText.to_string(), "Missing q");
	}

	#[test]
	fn recency_accepts_fractional_days() {
		let search = search();
		let hybrid = Hybrid::default();
		let builder = QueryBuilder::new(&search, &hybrid);

		assert_eq!(builder.recency_days(Some("7.9")), Some(7));
		assert_eq!(builder.recency_days(Some("0.5")), None);
		assert_eq!(builder.recency_days(Some("NaN")), None);
		assert_eq!(builder.recency_days(Some("inf")), None);
		assert_eq!(builder.recency_days(Some("100000")), Some(365));
	}

	#[test]
	fn alpha_is_clamped_and_defaulted() {
		let search = search();
		let hybrid = Hybrid::default();
		let builder = QueryBuilder::new(&search, &hybrid);

		assert_eq!(builder.alpha(None), 0.8);
		assert_eq!(builder.alpha(Some("abc")), 0.8);
		assert_eq!(builder.alpha(Some("1.7")), 1.0);
		assert_eq!(builder.alpha(Some("-3")), 0.0);
		assert_eq!(builder.alpha(Some("0.25")), 0.25);
	}
}
