//! HNSW tuning parameters.

/// Construction/search parameters for an HNSW graph.
///
/// Defaults match the fixed values named in the design: `M = 16`
/// (`M_max0 = 2M` at layer 0), `ef_construction = 200`, and an
/// `ef_search` floor of 50 (actual `ef_search` at query time is
/// `max(k, ef_search_floor)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HnswParams {
    /// Neighbors kept per node per layer above layer 0.
    pub m: usize,
    /// Beam width used while selecting neighbors during insertion.
    pub ef_construction: usize,
    /// Floor for the search-time beam width; actual width is
    /// `max(k, ef_search_floor)`.
    pub ef_search_floor: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search_floor: 50,
        }
    }
}

impl HnswParams {
    /// `M_max0`, the neighbor cap at layer 0 (`2 * m`).
    #[must_use]
    pub const fn max_connections_0(&self) -> usize {
        self.m * 2
    }

    /// The search-time beam width for a query requesting `k` results.
    #[must_use]
    pub fn ef_search(&self, k: usize) -> usize {
        k.max(self.ef_search_floor)
    }
}
