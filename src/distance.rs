//! Distance metrics and the unified, normalized `score()` used internally
//! for top-k selection and by the MMR re-ranker.

use crate::error::{Error, Result};
use crate::simd;

/// Distance/similarity metric a collection is created with.
///
/// `Hnsw` and `Binary` select a storage/search strategy as well as a
/// distance function: `Hnsw` builds a graph index over the (euclidean)
/// distance; `Binary` scores via Hamming distance over sign signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance. Smaller is more similar.
    Euclidean,
    /// Cosine similarity over unit-normalized vectors. Larger is more similar.
    Cosine,
    /// Raw dot product (maximum inner product search). Larger is more similar.
    Dot,
    /// HNSW graph index over the euclidean distance.
    Hnsw,
    /// Hamming distance over sign-bit signatures. Smaller is more similar.
    Binary,
}

impl DistanceMetric {
    /// Parses a metric identifier as used at the external API boundary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMetric`] for any other string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "euclidean" => Ok(Self::Euclidean),
            "cosine" => Ok(Self::Cosine),
            "dot" => Ok(Self::Dot),
            "hnsw" => Ok(Self::Hnsw),
            "binary" => Ok(Self::Binary),
            other => Err(Error::InvalidMetric(other.to_string())),
        }
    }

    /// Whether the collection's final ranking order is ascending
    /// (smaller reported number is more similar, as for `Euclidean`/`Binary`)
    /// or descending (as for `Cosine`/`Dot`/`Hnsw`).
    #[must_use]
    pub const fn higher_is_better(self) -> bool {
        !matches!(self, Self::Euclidean | Self::Binary)
    }

    /// Whether new rows should be routed through the HNSW index.
    #[must_use]
    pub const fn is_hnsw(self) -> bool {
        matches!(self, Self::Hnsw)
    }

    /// Whether vectors must be unit-normalized at insert time.
    #[must_use]
    pub const fn is_cosine(self) -> bool {
        matches!(self, Self::Cosine)
    }
}

/// Computes the normalized `[0, 1]`-ish similarity `score()` (larger is
/// always better), per metric:
///
/// | metric | formula |
/// |---|---|
/// | euclidean | `1 / (1 + l2(q, v))` |
/// | cosine | `(dot(normalize(q), v) + 1) / 2` (`v` assumed pre-normalized) |
/// | dot | raw `dot(q, v)`, unclamped |
/// | hnsw | the underlying metric's score (euclidean) |
/// | binary | `1 - hamming(compress(q), bits) / dim` |
///
/// # Panics
///
/// Panics if `query` and `stored_vec` have different lengths (for metrics
/// that use `stored_vec`), or if `compress(query)` and `stored_bits` have
/// a different number of words (for `Binary`/`Hnsw`-on-binary data). This
/// is a programmer error at this layer; callers validate dimensions first.
#[must_use]
pub fn score(query: &[f32], stored_vec: &[f32], stored_bits: &[u64], metric: DistanceMetric) -> f32 {
    match metric {
        DistanceMetric::Euclidean | DistanceMetric::Hnsw => {
            1.0 / (1.0 + simd::l2(query, stored_vec))
        }
        DistanceMetric::Cosine => {
            let q_norm = simd::normalize(query);
            (simd::dot(&q_norm, stored_vec) + 1.0) / 2.0
        }
        DistanceMetric::Dot => simd::dot(query, stored_vec),
        DistanceMetric::Binary => {
            let q_bits = simd::compress(query);
            let dim = query.len() as f32;
            1.0 - (simd::hamming(&q_bits, stored_bits) as f32 / dim)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn euclidean_score_matches_example() {
        // insert ("a", [0,0]), ("b", [3,4]); score(query=[0,0], "b", euclidean) = 1/6
        let s = score(&[0.0, 0.0], &[3.0, 4.0], &[], DistanceMetric::Euclidean);
        assert!(approx(s, 1.0 / 6.0));
    }

    #[test]
    fn dot_score_matches_example() {
        let s = score(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[], DistanceMetric::Dot);
        assert!(approx(s, 32.0));
    }

    #[test]
    fn self_score_is_one_except_dot() {
        let v = simd::normalize(&[1.0, 2.0, 3.0]);
        let bits = simd::compress(&v);
        assert!(approx(score(&v, &v, &bits, DistanceMetric::Euclidean), 1.0));
        assert!(approx(score(&v, &v, &bits, DistanceMetric::Cosine), 1.0));
        assert!(approx(score(&v, &v, &bits, DistanceMetric::Binary), 1.0));

        let raw = [1.0, 2.0, 3.0];
        let expected_sq_norm = simd::dot(&raw, &raw);
        assert!(approx(
            score(&raw, &raw, &[], DistanceMetric::Dot),
            expected_sq_norm
        ));
    }

    #[test]
    fn parse_rejects_unknown_metric() {
        assert!(matches!(
            DistanceMetric::parse("manhattan"),
            Err(Error::InvalidMetric(_))
        ));
    }
}
