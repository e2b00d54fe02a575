//! Collection state: the row slab, lookup maps, and HNSW index.

use std::collections::HashMap;

use crate::distance::DistanceMetric;
use crate::index::{HnswGraph, HnswParams};
use crate::point::Metadata;

/// One stored embedding, internal to the slab.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub(crate) value: String,
    /// Empty when `keep_raw = false` and `metric = Binary`.
    pub(crate) vector: Vec<f32>,
    pub(crate) signature: Vec<u64>,
    pub(crate) metadata: Option<Metadata>,
}

/// A named bucket of fixed-dimension embeddings with one distance metric.
///
/// Every operation takes `&mut self` or `&self` without its own internal
/// locking — callers (typically [`crate::Database`]) wrap a `Collection`
/// in a `RwLock` and take the appropriate lock for the whole call, per
/// the concurrency model: reads share a lock, writes take it exclusively,
/// and no reference into the collection ever escapes that lock.
pub struct Collection {
    pub(crate) dim: usize,
    pub(crate) metric: DistanceMetric,
    pub(crate) keep_raw: bool,
    pub(crate) hnsw_params: HnswParams,

    pub(crate) rows: Vec<Option<Row>>,
    pub(crate) by_value: HashMap<String, usize>,
    pub(crate) by_signature: HashMap<Vec<u64>, usize>,
    pub(crate) free_list: Vec<usize>,
    pub(crate) hnsw: Option<HnswGraph>,
}

impl Collection {
    /// Creates an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `dim == 0`.
    pub fn new(dim: usize, metric: DistanceMetric, keep_raw: bool) -> crate::Result<Self> {
        Self::with_hnsw_params(dim, metric, keep_raw, HnswParams::default())
    }

    /// Creates an empty collection with explicit HNSW tuning parameters
    /// (ignored unless `metric = DistanceMetric::Hnsw`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `dim == 0`.
    pub fn with_hnsw_params(
        dim: usize,
        metric: DistanceMetric,
        keep_raw: bool,
        hnsw_params: HnswParams,
    ) -> crate::Result<Self> {
        if dim == 0 {
            return Err(crate::Error::InvalidArgument(
                "dim must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            dim,
            metric,
            // keep_raw is only ever honored for Binary; every other
            // metric retains raw vectors unconditionally (invariant 7).
            keep_raw: keep_raw || !matches!(metric, DistanceMetric::Binary),
            hnsw_params,
            rows: Vec::new(),
            by_value: HashMap::new(),
            by_signature: HashMap::new(),
            free_list: Vec::new(),
            hnsw: metric.is_hnsw().then(|| HnswGraph::new(hnsw_params)),
        })
    }

    /// The dimension every stored vector has.
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// This collection's distance metric.
    #[must_use]
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of live rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    /// Whether the collection currently holds no live rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }

    /// Fetches a row's vector by id, cloning it out.
    ///
    /// Used by the HNSW graph, which holds no vectors of its own.
    pub(crate) fn vector_of(&self, row_id: usize) -> Vec<f32> {
        self.rows[row_id]
            .as_ref()
            .map(|r| r.vector.clone())
            .unwrap_or_default()
    }

    /// Whether `row_id` still refers to a live (non-freed) slot.
    pub(crate) fn is_live(&self, row_id: usize) -> bool {
        self.rows.get(row_id).is_some_and(Option::is_some)
    }
}
