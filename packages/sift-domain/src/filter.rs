//! Metadata predicates in the vector index's filter dialect.
//!
//! A [`MetadataFilter`] holds at most one [`Predicate`] per [`MetadataField`]. Predicates on
//! different fields are conjunctive; the index treats a multi-key filter object as an implicit
//! `$and`, so the wire form is a flat object keyed by field name.

use std::collections::{BTreeMap, HashSet};

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;

/// Metadata fields the proxy knows how to filter on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetadataField {
	/// Normalized content type label, written by the token-mode ingestion path.
	FinalType,
	/// Raw content type label, as entered by editors.
	Type,
	/// Strict `YYYY-MM-DD` publication date.
	Date,
	/// Publication date in whatever format the editor typed.
	DateLabel,
}
impl MetadataField {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::FinalType => "final_type",
			Self::Type => "Type",
			Self::Date => "date",
			Self::DateLabel => "Date",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
	In(Vec<String>),
	NotIn(Vec<String>),
	Gte(String),
}
impl Predicate {
	/// Builds an `$in` predicate, dropping duplicates while keeping first-seen order.
	pub fn in_set<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::In(dedup(values))
	}

	pub fn not_in_set<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::NotIn(dedup(values))
	}

	pub fn operator(&self) -> &'static str {
		match self {
			Self::In(_) => "$in",
			Self::NotIn(_) => "$nin",
			Self::Gte(_) => "$gte",
		}
	}

	pub fn values(&self) -> &[String] {
		match self {
			Self::In(values) | Self::NotIn(values) => values,
			Self::Gte(value) => std::slice::from_ref(value),
		}
	}
}
impl Serialize for Predicate {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(1))?;

		match self {
			Self::In(values) | Self::NotIn(values) => map.serialize_entry(self.operator(), values)?,
			Self::Gte(value) => map.serialize_entry(self.operator(), value)?,
		}

		map.end()
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataFilter {
	predicates: BTreeMap<MetadataField, Predicate>,
}
impl MetadataFilter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the predicate for `field`, returning the one it replaced.
	pub fn insert(&mut self, field: MetadataField, predicate: Predicate) -> Option<Predicate> {
		self.predicates.insert(field, predicate)
	}

	pub fn get(&self, field: MetadataField) -> Option<&Predicate> {
		self.predicates.get(&field)
	}

	pub fn is_empty(&self) -> bool {
		self.predicates.is_empty()
	}

	pub fn len(&self) -> usize {
		self.predicates.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = (MetadataField, &Predicate)> {
		self.predicates.iter().map(|(field, predicate)| (*field, predicate))
	}

	pub fn to_value(&self) -> Value {
		serde_json::to_value(self).unwrap_or(Value::Null)
	}

	/// `None` when no predicate is set, so callers can omit the filter entirely.
	pub fn into_option(self) -> Option<Self> {
		if self.is_empty() { None } else { Some(self) }
	}
}
impl Serialize for MetadataFilter {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(self.predicates.len()))?;

		for (field, predicate) in &self.predicates {
			map.serialize_entry(field.as_str(), predicate)?;
		}

		map.end()
	}
}

fn dedup<I, S>(values: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for value in values {
		let value = value.into();

		if seen.insert(value.clone()) {
			out.push(value);
		}
	}

	out
}
