//! Approximate nearest-neighbor indexing.

pub mod hnsw;

pub use hnsw::{HnswGraph, HnswParams, NodeId};
