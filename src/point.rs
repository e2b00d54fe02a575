//! Record and result types returned across the collection boundary.

use std::collections::HashMap;

/// String-to-string metadata attached to an embedding.
pub type Metadata = HashMap<String, String>;

/// An embedding record as handed back to callers.
///
/// `vector` is empty when the owning collection was created with
/// `metric = Binary, keep_raw = false` — the raw vector was discarded
/// and only the sign signature is retained internally.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The record's unique text key.
    pub value: String,
    /// The stored vector, or empty if raw storage was not kept.
    pub vector: Vec<f32>,
    /// Optional string-to-string metadata.
    pub metadata: Option<Metadata>,
}

/// One hit from [`crate::collection::Collection::similarity_search`].
///
/// `numeric` is a raw distance (euclidean, binary: ascending, smaller is
/// more similar) or a normalized similarity score (cosine, dot, hnsw:
/// descending, larger is more similar) depending on the collection's
/// metric — see [`crate::distance::DistanceMetric::higher_is_better`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The matching record's value.
    pub value: String,
    /// Raw distance or normalized score, depending on metric.
    pub numeric: f32,
}

/// One hit from an MMR re-ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MmrHit {
    /// The matching record's value.
    pub value: String,
    /// The MMR objective value at the step this candidate was picked.
    pub mmr_score: f32,
}
