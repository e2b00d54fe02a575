//! Maximal Marginal Relevance re-ranking.

use std::collections::HashMap;

use crate::distance::{self, DistanceMetric};
use crate::error::{Error, Result};
use crate::point::MmrHit;
use crate::simd;

use super::types::Collection;

/// One resolved candidate: caller-supplied relevance plus the vector and
/// signature needed to compute diversity against other candidates.
struct Candidate {
    value: String,
    relevance: f32,
    vector: Vec<f32>,
    signature: Vec<u64>,
}

impl Collection {
    /// Re-ranks `initial` — an already-scored candidate list, most
    /// relevant first is not required — to balance relevance against
    /// diversity, resolving each candidate's vector from this collection.
    ///
    /// Greedily picks, at each step, the unpicked candidate maximizing
    /// `alpha * relevance - (1 - alpha) * diversity`, where `relevance` is
    /// the caller-supplied score and `diversity` is the candidate's
    /// highest [`distance::score`] against any already picked candidate.
    /// Candidates whose value is not found in this collection are skipped
    /// rather than erroring.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `alpha` is outside `[0.0, 1.0]`.
    pub fn mmr_rerank(&self, initial: &[(String, f32)], alpha: f32, k: usize) -> Result<Vec<MmrHit>> {
        check_alpha(alpha)?;

        let candidates: Vec<Candidate> = initial
            .iter()
            .filter_map(|(value, relevance)| {
                let &row_id = self.by_value.get(value)?;
                let row = self.rows[row_id].as_ref()?;
                Some(Candidate {
                    value: row.value.clone(),
                    relevance: *relevance,
                    vector: row.vector.clone(),
                    signature: row.signature.clone(),
                })
            })
            .collect();

        Ok(select(candidates, self.metric, alpha, k))
    }
}

/// Standalone MMR re-ranker: an initial `(value, score)` candidate list,
/// an explicit `value -> vector` map to resolve each candidate, a distance
/// metric, an `alpha ∈ [0, 1]`, and a target output length `k`.
///
/// Candidates absent from `vectors` are skipped rather than erroring.
/// Returns at most `min(k, candidates with a resolvable vector)` hits,
/// with no duplicate values.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `alpha` is outside `[0.0, 1.0]`.
pub fn mmr_rerank(
    initial: &[(String, f32)],
    vectors: &HashMap<String, Vec<f32>>,
    metric: DistanceMetric,
    alpha: f32,
    k: usize,
) -> Result<Vec<MmrHit>> {
    check_alpha(alpha)?;

    let candidates: Vec<Candidate> = initial
        .iter()
        .filter_map(|(value, relevance)| {
            let vector = vectors.get(value)?;
            Some(Candidate {
                value: value.clone(),
                relevance: *relevance,
                signature: simd::compress(vector),
                vector: vector.clone(),
            })
        })
        .collect();

    Ok(select(candidates, metric, alpha, k))
}

fn check_alpha(alpha: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(Error::InvalidArgument(
            "alpha must be within [0.0, 1.0]".to_string(),
        ));
    }
    Ok(())
}

/// Greedy MMR selection shared by both entry points: `rel` is always the
/// candidate's supplied score, never recomputed against a query.
fn select(candidates: Vec<Candidate>, metric: DistanceMetric, alpha: f32, k: usize) -> Vec<MmrHit> {
    let final_k = k.min(candidates.len());
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();
    let mut selected: Vec<MmrHit> = Vec::with_capacity(final_k);
    let mut selected_idx: Vec<usize> = Vec::with_capacity(final_k);

    while selected.len() < final_k {
        let mut best: Option<(usize, usize, f32)> = None; // (position in remaining, candidate idx, mmr)

        for (pos, &idx) in remaining.iter().enumerate() {
            let candidate = &candidates[idx];
            let rel = candidate.relevance;

            let div = selected_idx
                .iter()
                .map(|&sel| {
                    let picked = &candidates[sel];
                    distance::score(&candidate.vector, &picked.vector, &picked.signature, metric)
                })
                .fold(f32::MIN, f32::max);
            let div = if selected_idx.is_empty() { 0.0 } else { div };

            let mmr = alpha * rel - (1.0 - alpha) * div;

            if best.is_none_or(|(_, _, best_mmr)| mmr > best_mmr) {
                best = Some((pos, idx, mmr));
            }
        }

        let (pos, idx, mmr) = best.expect("remaining is non-empty while selected.len() < final_k");
        remaining.swap_remove(pos);
        selected_idx.push(idx);
        selected.push(MmrHit {
            value: candidates[idx].value.clone(),
            mmr_score: mmr,
        });
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors_map(pairs: &[(&str, [f32; 2])]) -> HashMap<String, Vec<f32>> {
        pairs.iter().map(|(v, vec)| (v.to_string(), vec.to_vec())).collect()
    }

    #[test]
    fn alpha_one_returns_descending_initial_score_order() {
        // Spec concrete scenario: candidates [("a",0.9),("b",0.8),("c",0.7)],
        // vectors (1,0),(0,1),(1,1), metric dot, alpha=1.0, k=2 => ["a","b"].
        let vectors = vectors_map(&[("a", [1.0, 0.0]), ("b", [0.0, 1.0]), ("c", [1.0, 1.0])]);
        let initial = vec![
            ("a".to_string(), 0.9),
            ("b".to_string(), 0.8),
            ("c".to_string(), 0.7),
        ];

        let hits = mmr_rerank(&initial, &vectors, DistanceMetric::Dot, 1.0, 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].value, "a");
        assert_eq!(hits[1].value, "b");
    }

    #[test]
    fn final_k_larger_than_candidates_returns_all() {
        let vectors = vectors_map(&[("a", [1.0, 0.0])]);
        let initial = vec![("a".to_string(), 0.5)];
        let hits = mmr_rerank(&initial, &vectors, DistanceMetric::Euclidean, 0.5, 5).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn rejects_alpha_out_of_range() {
        let vectors = HashMap::new();
        let initial: Vec<(String, f32)> = vec![];
        assert!(mmr_rerank(&initial, &vectors, DistanceMetric::Euclidean, 1.5, 1).is_err());
    }

    #[test]
    fn unresolvable_candidates_are_skipped() {
        let vectors = vectors_map(&[("a", [1.0, 0.0])]);
        let initial = vec![("a".to_string(), 0.9), ("ghost".to_string(), 0.8)];
        let hits = mmr_rerank(&initial, &vectors, DistanceMetric::Euclidean, 1.0, 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].value, "a");
    }

    #[test]
    fn no_duplicate_values_in_output() {
        let vectors = vectors_map(&[("a", [1.0, 0.0]), ("b", [0.0, 1.0]), ("c", [1.0, 1.0])]);
        let initial = vec![
            ("a".to_string(), 0.9),
            ("b".to_string(), 0.6),
            ("c".to_string(), 0.7),
        ];
        let hits = mmr_rerank(&initial, &vectors, DistanceMetric::Euclidean, 0.5, 3).unwrap();
        let mut values: Vec<&str> = hits.iter().map(|h| h.value.as_str()).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 3);
    }
}
