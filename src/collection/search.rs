//! Similarity search: dispatches to HNSW or a brute-force SIMD scan,
//! applies an optional metadata filter, and builds the top-k result.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rayon::prelude::*;
use tracing::instrument;

use crate::distance::{self, DistanceMetric};
use crate::error::{Error, Result};
use crate::point::{Metadata, SearchHit};
use crate::simd;

use super::types::Collection;

/// Above this many live rows, brute force keeps only a bounded min-heap
/// of size `k` instead of scoring-then-sorting the whole collection.
const HEAP_THRESHOLD: usize = 1024;

/// Above this many live rows, the brute-force scan partitions the row
/// range across a rayon thread pool.
const PARALLEL_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Scored {
    score: f32,
    row_id: usize,
    numeric: f32,
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}
impl Eq for Scored {}
impl Ord for Scored {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.score.total_cmp(&other.score)
    }
}
impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Collection {
    /// Finds the `k` records most similar to `query`.
    ///
    /// The returned `numeric` is a raw distance (ascending, smaller is
    /// more similar) for `Euclidean`/`Binary`, or a normalized score
    /// (descending, larger is more similar) for `Cosine`/`Dot`/`Hnsw` —
    /// see [`DistanceMetric::higher_is_better`].
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `query.len() != self.dim()`;
    /// [`Error::InvalidArgument`] if `k == 0`, or if `filter` is given
    /// while the collection's metric is `Hnsw` (filtering is not
    /// supported on the index path).
    #[instrument(skip(self, query, filter))]
    pub fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&Metadata>,
    ) -> Result<Vec<SearchHit>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Err(Error::InvalidArgument("k must be at least 1".to_string()));
        }
        if filter.is_some() && self.metric.is_hnsw() {
            return Err(Error::InvalidArgument(
                "filter unsupported for hnsw".to_string(),
            ));
        }

        let query = if self.metric.is_cosine() {
            simd::normalize(query)
        } else {
            query.to_vec()
        };

        let scored = if let Some(hnsw) = &self.hnsw {
            self.hnsw_search(hnsw, &query, k)
        } else {
            self.brute_force_search(&query, k, filter)
        };

        // `scored` is already ordered by descending score, which is
        // simultaneously "ascending raw distance" for Euclidean/Binary
        // (score is a strictly decreasing function of distance) and
        // "descending score" for Cosine/Dot/Hnsw — exactly the order
        // each metric's output contract calls for.
        Ok(scored
            .into_iter()
            .map(|(row_id, _score, numeric)| {
                let value = self.rows[row_id]
                    .as_ref()
                    .expect("live row id")
                    .value
                    .clone();
                SearchHit { value, numeric }
            })
            .collect())
    }

    fn hnsw_search(
        &self,
        hnsw: &crate::index::HnswGraph,
        query: &[f32],
        k: usize,
    ) -> Vec<(usize, f32, f32)> {
        let ef = self.hnsw_params.ef_search(k);
        let get_vector = |id: usize| self.vector_of(id);
        let is_live = |id: usize| self.is_live(id);

        hnsw.search(query, k, ef, get_vector, is_live)
            .into_iter()
            .map(|(row_id, raw_distance)| {
                let score = 1.0 / (1.0 + raw_distance);
                (row_id, score, score)
            })
            .collect()
    }

    fn brute_force_search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&Metadata>,
    ) -> Vec<(usize, f32, f32)> {
        let live_count = self.len();

        let score_row = |row_id: usize| -> Option<(usize, f32, f32)> {
            let row = self.rows[row_id].as_ref()?;
            if let Some(filter) = filter {
                let meta = row.metadata.as_ref();
                let matches = filter
                    .iter()
                    .all(|(key, val)| meta.is_some_and(|m| m.get(key) == Some(val)));
                if !matches {
                    return None;
                }
            }

            let score = distance::score(query, &row.vector, &row.signature, self.metric);
            let numeric = match self.metric {
                DistanceMetric::Euclidean => simd::l2(query, &row.vector),
                DistanceMetric::Binary => {
                    simd::hamming(&simd::compress(query), &row.signature) as f32
                }
                DistanceMetric::Cosine | DistanceMetric::Dot | DistanceMetric::Hnsw => score,
            };
            Some((row_id, score, numeric))
        };

        let candidates: Box<dyn Iterator<Item = (usize, f32, f32)>> =
            if live_count > PARALLEL_THRESHOLD {
                Box::new(
                    (0..self.rows.len())
                        .into_par_iter()
                        .filter_map(score_row)
                        .collect::<Vec<_>>()
                        .into_iter(),
                )
            } else {
                Box::new((0..self.rows.len()).filter_map(score_row))
            };

        if live_count > HEAP_THRESHOLD {
            let mut heap: BinaryHeap<Reverse<Scored>> = BinaryHeap::with_capacity(k + 1);
            for (row_id, score, numeric) in candidates {
                heap.push(Reverse(Scored { score, row_id, numeric }));
                if heap.len() > k {
                    heap.pop();
                }
            }
            let mut out: Vec<(usize, f32, f32)> = heap
                .into_iter()
                .map(|Reverse(s)| (s.row_id, s.score, s.numeric))
                .collect();
            out.sort_by(|a, b| b.1.total_cmp(&a.1));
            out
        } else {
            let mut out: Vec<(usize, f32, f32)> = candidates.collect();
            out.sort_by(|a, b| b.1.total_cmp(&a.1));
            out.truncate(k);
            out
        }
    }
}
