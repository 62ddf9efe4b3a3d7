use serde::{Deserialize, Serialize};

/// Weighted-term lexical vector, in the index's `{indices, values}` shape.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SparseVector {
	pub indices: Vec<u32>,
	pub values: Vec<f32>,
}
impl SparseVector {
	pub fn is_empty(&self) -> bool {
		self.indices.is_empty() || self.values.is_empty()
	}
}

/// Whether a sparse vector should be requested for this query.
pub fn wants_sparse(hybrid_enabled: bool, exact_phrase: Option<&str>) -> bool {
	hybrid_enabled && exact_phrase.is_some_and(|phrase| !phrase.trim().is_empty())
}

/// Combines the dense and sparse signals for the index.
///
/// With a usable sparse vector the dense components are scaled by `alpha` and the sparse vector
/// is attached as-is; the index adds the two similarities. Without one the dense vector is
/// returned untouched and no sparse field is sent, since some indexes reject empty sparse
/// payloads.
pub fn blend(
	dense: Vec<f32>,
	sparse: Option<SparseVector>,
	alpha: f32,
) -> (Vec<f32>, Option<SparseVector>) {
	match sparse.filter(|sparse| !sparse.is_empty()) {
		Some(sparse) => (dense.into_iter().map(|value| value * alpha).collect(), Some(sparse)),
		None => (dense, None),
	}
}
