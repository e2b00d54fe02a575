//! Integration tests covering the concrete worked scenarios and
//! cross-module invariants (a full `Database` round trip, not just a
//! single source file's unit tests).

use std::collections::HashMap;

use shoal::{Database, DistanceMetric, Error};

fn euclidean_db() -> Database {
    let db = Database::new();
    db.create_collection("docs", 2, DistanceMetric::Euclidean, true).unwrap();
    db
}

#[test]
fn euclidean_worked_example() {
    let db = euclidean_db();
    db.insert("docs", "a", vec![0.0, 0.0], None).unwrap();
    db.insert("docs", "b", vec![3.0, 4.0], None).unwrap();

    let hits = db.similarity_search("docs", &[0.0, 0.0], 2, None).unwrap();
    assert_eq!(hits[0].value, "a");
    assert!((hits[0].numeric - 0.0).abs() < 1e-6);
    assert_eq!(hits[1].value, "b");
    assert!((hits[1].numeric - 5.0).abs() < 1e-6);
}

#[test]
fn cosine_worked_example() {
    let db = Database::new();
    db.create_collection("docs", 2, DistanceMetric::Cosine, true).unwrap();
    db.insert("docs", "u", vec![1.0, 0.0], None).unwrap();
    db.insert("docs", "v", vec![0.0, 1.0], None).unwrap();

    let hits = db.similarity_search("docs", &[1.0, 0.0], 2, None).unwrap();
    assert_eq!(hits[0].value, "u");
    assert!((hits[0].numeric - 1.0).abs() < 1e-6);
    assert_eq!(hits[1].value, "v");
    assert!((hits[1].numeric - 0.5).abs() < 1e-6);
}

#[test]
fn dot_worked_example() {
    let db = Database::new();
    db.create_collection("docs", 3, DistanceMetric::Dot, true).unwrap();
    db.insert("docs", "x", vec![4.0, 5.0, 6.0], None).unwrap();

    let hits = db.similarity_search("docs", &[1.0, 2.0, 3.0], 1, None).unwrap();
    assert_eq!(hits[0].value, "x");
    assert!((hits[0].numeric - 32.0).abs() < 1e-6);
}

#[test]
fn binary_compress_worked_example() {
    let sig_a = shoal::compress(&[1.0, 2.0, 3.0, 4.0]);
    let sig_b = shoal::compress(&[-1.0, 2.0, -3.0, 4.0]);
    assert_eq!(shoal::hamming(&sig_a, &sig_b).unwrap(), 2);
}

#[test]
fn mmr_pure_relevance_matches_initial_order() {
    let db = euclidean_db();
    db.insert("docs", "a", vec![0.0, 0.0], None).unwrap();
    db.insert("docs", "b", vec![3.0, 4.0], None).unwrap();

    let initial = vec![("a".to_string(), 0.9), ("b".to_string(), 0.1)];
    let hits = db.mmr_rerank("docs", &initial, 1.0, 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].value, "a");
    assert_eq!(hits[1].value, "b");
}

#[test]
fn duplicate_value_rejected() {
    let db = euclidean_db();
    db.insert("docs", "e1", vec![1.0, 2.0], None).unwrap();
    let err = db.insert("docs", "e1", vec![3.0, 4.0], None).unwrap_err();
    assert!(matches!(err, Error::DuplicateValue(_)));
}

#[test]
fn duplicate_vector_rejected_by_sign_signature() {
    let db = euclidean_db();
    db.insert("docs", "e1", vec![1.0, 2.0], None).unwrap();
    // Same sign pattern (both strictly positive in both dims) collides.
    let err = db.insert("docs", "e2", vec![5.0, 7.0], None).unwrap_err();
    assert!(matches!(err, Error::DuplicateVector));
}

#[test]
fn delete_then_search_excludes_row() {
    let db = euclidean_db();
    db.insert("docs", "a", vec![0.0, 0.0], None).unwrap();
    db.insert("docs", "b", vec![3.0, 4.0], None).unwrap();
    db.delete("docs", "a").unwrap();

    let hits = db.similarity_search("docs", &[0.0, 0.0], 2, None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].value, "b");
}

#[test]
fn metadata_filter_excludes_non_matching_rows() {
    let db = euclidean_db();
    let mut lang_en = HashMap::new();
    lang_en.insert("lang".to_string(), "en".to_string());
    let mut lang_fr = HashMap::new();
    lang_fr.insert("lang".to_string(), "fr".to_string());

    db.insert("docs", "a", vec![0.0, 0.0], Some(lang_en.clone())).unwrap();
    db.insert("docs", "b", vec![1.0, 1.0], Some(lang_fr)).unwrap();

    let hits = db
        .similarity_search("docs", &[0.0, 0.0], 5, Some(&lang_en))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].value, "a");
}

#[test]
fn filter_with_hnsw_metric_is_rejected() {
    let db = Database::new();
    db.create_collection("docs", 2, DistanceMetric::Hnsw, true).unwrap();
    db.insert("docs", "a", vec![0.0, 0.0], None).unwrap();

    let mut filter = HashMap::new();
    filter.insert("k".to_string(), "v".to_string());
    let err = db
        .similarity_search("docs", &[0.0, 0.0], 1, Some(&filter))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn hnsw_recall_matches_brute_force_on_small_collection() {
    let db_hnsw = Database::new();
    db_hnsw.create_collection("docs", 2, DistanceMetric::Hnsw, true).unwrap();
    let db_brute = euclidean_db();

    let points: Vec<(&str, Vec<f32>)> = vec![
        ("p0", vec![0.0, 0.0]),
        ("p1", vec![1.0, 0.0]),
        ("p2", vec![0.0, 1.0]),
        ("p3", vec![10.0, 10.0]),
        ("p4", vec![10.0, 11.0]),
        ("p5", vec![-5.0, -5.0]),
    ];
    for (value, vector) in &points {
        db_hnsw.insert("docs", *value, vector.clone(), None).unwrap();
        db_brute.insert("docs", *value, vector.clone(), None).unwrap();
    }

    let query = [9.5, 10.5];
    let hnsw_hits = db_hnsw.similarity_search("docs", &query, 1, None).unwrap();
    let brute_hits = db_brute.similarity_search("docs", &query, 1, None).unwrap();
    assert_eq!(hnsw_hits[0].value, brute_hits[0].value);
}

#[test]
fn dimension_mismatch_reported_on_insert_and_search() {
    let db = euclidean_db();
    assert!(matches!(
        db.insert("docs", "a", vec![1.0], None),
        Err(Error::DimensionMismatch { expected: 2, actual: 1 })
    ));
    assert!(matches!(
        db.similarity_search("docs", &[1.0, 2.0, 3.0], 1, None),
        Err(Error::DimensionMismatch { expected: 2, actual: 3 })
    ));
}

#[test]
fn batch_insert_preserves_earlier_rows_on_later_failure() {
    let db = euclidean_db();
    let records = vec![
        ("a".to_string(), vec![0.0, 0.0], None),
        ("b".to_string(), vec![1.0, 1.0], None),
        ("a".to_string(), vec![2.0, 2.0], None), // duplicate value, fails
    ];
    let err = db.batch_insert("docs", records).unwrap_err();
    assert!(matches!(err, Error::DuplicateValue(_)));

    let all = db.get_all("docs").unwrap();
    assert_eq!(all.len(), 2);
}
