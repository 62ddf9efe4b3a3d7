use serde::Serialize;
use serde_json::{Map, Value};

use sift_providers::index::IndexMatch;

const TITLE_KEYS: &[&str] = &["title", "Title"];
const AUTHOR_KEYS: &[&str] = &["author", "Author"];
const URL_KEYS: &[&str] = &["url", "URL", "link", "Link"];
const PUBLICATION_KEYS: &[&str] = &["publication", "Publication"];
const TYPE_KEYS: &[&str] = &["final_type", "type", "Type"];
const DATE_KEYS: &[&str] = &["date", "Date"];
const SNIPPET_KEYS: &[&str] = &["snippet", "Snippet", "text"];
const SUMMARY_KEYS: &[&str] = &["ai_summary", "AI Summary", "summary", "Summary"];

/// One search hit as returned to callers.
///
/// Normalized fields come first; every other metadata key follows unchanged. A raw key that
/// shares a name with `id`, `score`, or a resolved normalized field is dropped.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultItem {
	pub id: String,
	pub score: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub author: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub publication: Option<Value>,
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub content_type: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub date: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub snippet: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub summary: Option<Value>,
	#[serde(flatten)]
	pub metadata: Map<String, Value>,
}
impl From<IndexMatch> for ResultItem {
	fn from(hit: IndexMatch) -> Self {
		let IndexMatch { id, score, mut metadata } = hit;
		let snippet = first_present(&metadata, SNIPPET_KEYS);
		let summary = first_present(&metadata, SUMMARY_KEYS).or_else(|| snippet.clone());
		let item = Self {
			id,
			score,
			title: first_present(&metadata, TITLE_KEYS),
			author: first_present(&metadata, AUTHOR_KEYS),
			url: first_present(&metadata, URL_KEYS),
			publication: first_present(&metadata, PUBLICATION_KEYS),
			content_type: first_present(&metadata, TYPE_KEYS),
			date: first_present(&metadata, DATE_KEYS),
			snippet,
			summary,
			metadata: Map::new(),
		};

		metadata.retain(|key, _| !item.shadows(key));

		Self { metadata, ..item }
	}
}
impl ResultItem {
	fn shadows(&self, key: &str) -> bool {
		match key {
			"id" | "score" => true,
			"title" => self.title.is_some(),
			"author" => self.author.is_some(),
			"url" => self.url.is_some(),
			"publication" => self.publication.is_some(),
			"type" => self.content_type.is_some(),
			"date" => self.date.is_some(),
			"snippet" => self.snippet.is_some(),
			"summary" => self.summary.is_some(),
			_ => false,
		}
	}
}

fn first_present(metadata: &Map<String, Value>, keys: &[&str]) -> Option<Value> {
	keys.iter().filter_map(|key| metadata.get(*key)).find(|value| is_present(value)).cloned()
}

fn is_present(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::String(text) => !text.trim().is_empty(),
		_ => true,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn hit(metadata: Value) -> IndexMatch {
		let Value::Object(metadata) = metadata else { panic!("metadata must be an object") };

		IndexMatch { id: "doc-1".to_string(), score: 0.5, metadata }
	}

	#[test]
	fn fallback_chains_pick_the_first_non_blank_value() {
		let item = ResultItem::from(hit(json!({
			"Title": "On Schools",
			"title": "  ",
			"Author": "Ann",
			"link": "https://example.com/schools",
			"Type": "Essay",
			"Date": "3/4/2026",
			"text": "Schools are...",
		})));

		assert_eq!(item.title, Some(json!("On Schools")));
		assert_eq!(item.author, Some(json!("Ann")));
		assert_eq!(item.url, Some(json!("https://example.com/schools")));
		assert_eq!(item.content_type, Some(json!("Essay")));
		assert_eq!(item.date, Some(json!("3/4/2026")));
		assert_eq!(item.snippet, Some(json!("Schools are...")));
		assert_eq!(item.publication, None);
	}

	#[test]
	fn summary_prefers_ai_summary_then_snippet() {
		let with_ai = ResultItem::from(hit(json!({ "AI Summary": "Short.", "snippet": "Long." })));
		let without_ai = ResultItem::from(hit(json!({ "ai_summary": "", "snippet": "Long." })));
		let bare = ResultItem::from(hit(json!({})));

		assert_eq!(with_ai.summary, Some(json!("Short.")));
		assert_eq!(without_ai.summary, Some(json!("Long.")));
		assert_eq!(bare.summary, None);
	}

	#[test]
	fn normalized_names_win_over_raw_keys() {
		let item = ResultItem::from(hit(json!({
			"id": "shadow",
			"score": 99,
			"type": "podcast",
			"final_type": "Podcast",
			"Type": "Podcast, Video",
			"custom": true,
		})));
		let json = serde_json::to_value(&item).expect("serialize failed");

		assert_eq!(json["id"], "doc-1");
		assert_eq!(json["score"], 0.5);
		assert_eq!(json["type"], "Podcast");
		assert_eq!(json["final_type"], "Podcast");
		assert_eq!(json["Type"], "Podcast, Video");
		assert_eq!(json["custom"], true);
	}

	#[test]
	fn unresolved_names_keep_raw_values() {
		let item = ResultItem::from(hit(json!({ "title": null, "date": "" })));
		let json = serde_json::to_value(&item).expect("serialize failed");

		assert_eq!(json, json!({ "id": "doc-1", "score": 0.5, "title": null, "date": "" }));
	}
}
