//! An in-memory vector collection engine.
//!
//! Named collections of fixed-dimension embeddings, searchable by one of
//! five distance behaviors (`euclidean`, `cosine`, `dot`, `hnsw`, `binary`),
//! with a brute-force SIMD scanner, an HNSW approximate index, sign-bit
//! compression, and an MMR diversity re-ranker. See [`Database`] for the
//! top-level entry point.

pub mod collection;
pub mod database;
pub mod distance;
mod error;
pub mod index;
pub mod point;
mod simd;

pub use collection::{mmr_rerank, Collection};
pub use database::Database;
pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use point::{Metadata, MmrHit, Record, SearchHit};

/// Euclidean (L2) distance between two equal-length vectors.
///
/// # Errors
///
/// [`Error::LengthMismatch`] if `a.len() != b.len()`.
pub fn euclidean(a: &[f32], b: &[f32]) -> Result<f32> {
    check_lengths(a.len(), b.len())?;
    Ok(simd::l2(a, b))
}

/// Cosine similarity between two equal-length vectors, in `[-1.0, 1.0]`.
///
/// # Errors
///
/// [`Error::LengthMismatch`] if `a.len() != b.len()`.
pub fn cosine(a: &[f32], b: &[f32]) -> Result<f32> {
    check_lengths(a.len(), b.len())?;
    let a_norm = simd::normalize(a);
    let b_norm = simd::normalize(b);
    Ok(simd::dot(&a_norm, &b_norm))
}

/// Raw dot product of two equal-length vectors.
///
/// # Errors
///
/// [`Error::LengthMismatch`] if `a.len() != b.len()`.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32> {
    check_lengths(a.len(), b.len())?;
    Ok(simd::dot(a, b))
}

/// Hamming distance between two packed sign signatures of equal word count.
///
/// # Errors
///
/// [`Error::LengthMismatch`] if `a.len() != b.len()`.
pub fn hamming(a: &[u64], b: &[u64]) -> Result<u32> {
    check_lengths(a.len(), b.len())?;
    Ok(simd::hamming(a, b))
}

/// Packs one sign bit per element (`1` iff strictly positive) into `u64`
/// words, LSB-first.
#[must_use]
pub fn compress(v: &[f32]) -> Vec<u64> {
    simd::compress(v)
}

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(Error::LengthMismatch { a, b });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_matches_simd_kernel() {
        assert!((euclidean(&[0.0, 0.0], &[3.0, 4.0]).unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn euclidean_rejects_length_mismatch() {
        assert!(matches!(
            euclidean(&[0.0], &[0.0, 0.0]),
            Err(Error::LengthMismatch { a: 1, b: 2 })
        ));
    }

    #[test]
    fn dot_matches_worked_example() {
        assert!((dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap() - 32.0).abs() < 1e-6);
    }

    #[test]
    fn compress_is_public_and_deterministic() {
        assert_eq!(compress(&[1.0, -1.0]), compress(&[1.0, -1.0]));
    }
}
