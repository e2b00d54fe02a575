//! `Database`: a sharded concurrent map of named collections.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::instrument;

use crate::collection::Collection;
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::HnswParams;
use crate::point::{Metadata, MmrHit, Record, SearchHit};

/// Container for named collections.
///
/// Each collection is wrapped in its own `RwLock`: readers (`get_by_value`,
/// `similarity_search`, ...) take a shared lock for the call's duration;
/// writers (`insert`, `delete`, ...) take it exclusively. There is no
/// cross-collection atomicity and no mid-operation cancellation — an
/// operation runs to completion once its lock is acquired.
#[derive(Default)]
pub struct Database {
    collections: DashMap<String, Arc<RwLock<Collection>>>,
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }

    /// Creates a new, empty collection with default HNSW tuning.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionExists`] if `name` is already in use;
    /// [`Error::InvalidArgument`] if `dim == 0`.
    #[instrument(skip(self))]
    pub fn create_collection(
        &self,
        name: impl Into<String>,
        dim: usize,
        metric: DistanceMetric,
        keep_raw: bool,
    ) -> Result<()> {
        self.create_collection_with_hnsw_params(name, dim, metric, keep_raw, HnswParams::default())
    }

    /// Creates a new, empty collection with explicit HNSW tuning
    /// (ignored unless `metric = DistanceMetric::Hnsw`).
    ///
    /// # Errors
    ///
    /// [`Error::CollectionExists`] if `name` is already in use;
    /// [`Error::InvalidArgument`] if `dim == 0`.
    pub fn create_collection_with_hnsw_params(
        &self,
        name: impl Into<String>,
        dim: usize,
        metric: DistanceMetric,
        keep_raw: bool,
        hnsw_params: HnswParams,
    ) -> Result<()> {
        let name = name.into();
        if self.collections.contains_key(&name) {
            return Err(Error::CollectionExists(name));
        }

        let collection = Collection::with_hnsw_params(dim, metric, keep_raw, hnsw_params)?;
        self.collections.insert(name, Arc::new(RwLock::new(collection)));
        Ok(())
    }

    /// Drops a collection and all of its rows.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] if `name` does not exist.
    #[instrument(skip(self))]
    pub fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    /// Lists every collection name, in no particular order.
    #[must_use]
    pub fn list_collections(&self) -> Vec<String> {
        self.collections.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Whether a collection with this name exists.
    #[must_use]
    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Inserts a record into `collection`.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] if `collection` does not exist, plus
    /// any error [`Collection::insert`] returns.
    pub fn insert(
        &self,
        collection: &str,
        value: impl Into<String>,
        vector: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<String> {
        self.with_write(collection, |c| c.insert(value, vector, metadata))
    }

    /// Inserts every record in `records`, stopping at the first error.
    ///
    /// Records inserted before the failing one remain in the collection —
    /// there is no rollback. Returns the values successfully inserted.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] if `collection` does not exist, plus
    /// whichever error the first failing [`Collection::insert`] call
    /// returns.
    pub fn batch_insert(
        &self,
        collection: &str,
        records: Vec<(String, Vec<f32>, Option<Metadata>)>,
    ) -> Result<Vec<String>> {
        self.with_write(collection, |c| {
            let mut inserted = Vec::with_capacity(records.len());
            for (value, vector, metadata) in records {
                inserted.push(c.insert(value, vector, metadata)?);
            }
            Ok(inserted)
        })
    }

    /// Looks up a record by value.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] if `collection` does not exist;
    /// [`Error::NotFound`] if no live row has this value.
    pub fn get_by_value(&self, collection: &str, value: &str) -> Result<Record> {
        self.with_read(collection, |c| c.get_by_value(value))
    }

    /// Looks up a record by its exact vector.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] if `collection` does not exist, plus
    /// any error [`Collection::get_by_vector`] returns.
    pub fn get_by_vector(&self, collection: &str, vector: &[f32]) -> Result<Record> {
        self.with_read(collection, |c| c.get_by_vector(vector))
    }

    /// Returns every live record in `collection`.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] if `collection` does not exist.
    pub fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        self.with_read(collection, |c| Ok(c.get_all()))
    }

    /// Deletes a record by value.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] if `collection` does not exist;
    /// [`Error::NotFound`] if no live row has this value.
    pub fn delete(&self, collection: &str, value: &str) -> Result<String> {
        self.with_write(collection, |c| c.delete(value))
    }

    /// Finds the `k` records most similar to `query` in `collection`.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] if `collection` does not exist, plus
    /// any error [`Collection::similarity_search`] returns.
    pub fn similarity_search(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
        filter: Option<&Metadata>,
    ) -> Result<Vec<SearchHit>> {
        self.with_read(collection, |c| c.similarity_search(query, k, filter))
    }

    /// Re-ranks `initial` — a `(value, relevance score)` candidate list —
    /// for diversity, resolving each candidate's vector from `collection`.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] if `collection` does not exist, plus
    /// any error [`Collection::mmr_rerank`] returns.
    pub fn mmr_rerank(
        &self,
        collection: &str,
        initial: &[(String, f32)],
        alpha: f32,
        k: usize,
    ) -> Result<Vec<MmrHit>> {
        self.with_read(collection, |c| c.mmr_rerank(initial, alpha, k))
    }

    fn with_read<T>(&self, name: &str, f: impl FnOnce(&Collection) -> Result<T>) -> Result<T> {
        let entry = self
            .collections
            .get(name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))?;
        let guard = entry.read();
        f(&guard)
    }

    fn with_write<T>(&self, name: &str, f: impl FnOnce(&mut Collection) -> Result<T>) -> Result<T> {
        let entry = self
            .collections
            .get(name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))?;
        let mut guard = entry.write();
        f(&mut guard)
    }
}
