//! Insert / lookup / delete on a [`Collection`], per the collection store
//! contract: O(1) insert/lookup/delete, invariants 1-7 enforced here.

use tracing::instrument;

use crate::error::{Error, Result};
use crate::point::{Metadata, Record};
use crate::simd;

use super::types::{Collection, Row};

impl Collection {
    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `vector.len() != self.dim()`;
    /// [`Error::DuplicateValue`] if `value` already names a live row;
    /// [`Error::DuplicateVector`] if the sign signature collides with a
    /// live row (an approximate, by-design duplicate check).
    #[instrument(skip(self, vector, metadata))]
    pub fn insert(
        &mut self,
        value: impl Into<String>,
        mut vector: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<String> {
        let value = value.into();

        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }

        if self.metric.is_cosine() {
            vector = simd::normalize(&vector);
        }

        let signature = simd::compress(&vector);

        if self.by_value.contains_key(&value) {
            return Err(Error::DuplicateValue(value));
        }
        if self.by_signature.contains_key(&signature) {
            return Err(Error::DuplicateVector);
        }

        let stored_vector = if !self.keep_raw {
            Vec::new()
        } else {
            vector.clone()
        };

        let row = Row {
            value: value.clone(),
            vector: stored_vector,
            signature: signature.clone(),
            metadata,
        };

        let row_id = if let Some(id) = self.free_list.pop() {
            self.rows[id] = Some(row);
            id
        } else {
            self.rows.push(Some(row));
            self.rows.len() - 1
        };

        self.by_value.insert(value.clone(), row_id);
        self.by_signature.insert(signature, row_id);

        if let Some(hnsw) = &mut self.hnsw {
            let rows = &self.rows;
            hnsw.insert(row_id, &vector, move |id| {
                rows[id].as_ref().map(|r| r.vector.clone()).unwrap_or_default()
            });
        }

        tracing::debug!(value = %value, row_id, "inserted row");
        Ok(value)
    }

    /// Looks up a record by its value.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no live row has this value.
    #[must_use = "handle the lookup result"]
    pub fn get_by_value(&self, value: &str) -> Result<Record> {
        let &row_id = self.by_value.get(value).ok_or_else(|| Error::NotFound(value.to_string()))?;
        let row = self.rows[row_id].as_ref().expect("by_value must reference a live row");
        Ok(Self::row_to_record(row))
    }

    /// Looks up a record by its exact vector (matched via sign signature).
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `vector.len() != self.dim()`;
    /// [`Error::NotFound`] if no live row has a matching signature.
    pub fn get_by_vector(&self, vector: &[f32]) -> Result<Record> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }

        let query = if self.metric.is_cosine() {
            simd::normalize(vector)
        } else {
            vector.to_vec()
        };
        let signature = simd::compress(&query);

        let &row_id = self
            .by_signature
            .get(&signature)
            .ok_or_else(|| Error::NotFound("no matching vector".to_string()))?;
        let row = self.rows[row_id].as_ref().expect("by_signature must reference a live row");
        Ok(Self::row_to_record(row))
    }

    /// Returns every live record, in row-id order.
    #[must_use]
    pub fn get_all(&self) -> Vec<Record> {
        self.rows.iter().flatten().map(Self::row_to_record).collect()
    }

    /// Deletes a record by value.
    ///
    /// The corresponding HNSW node, if any, is left in place as an
    /// orphan: HNSW is insert-only (no graph deletion), so
    /// [`super::search`] filters dead row ids out of its results instead.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no live row has this value.
    #[instrument(skip(self))]
    pub fn delete(&mut self, value: &str) -> Result<String> {
        let row_id = self
            .by_value
            .remove(value)
            .ok_or_else(|| Error::NotFound(value.to_string()))?;

        let row = self.rows[row_id].take().expect("by_value must reference a live row");
        self.by_signature.remove(&row.signature);
        self.free_list.push(row_id);

        tracing::debug!(value, row_id, "deleted row");
        Ok(value.to_string())
    }

    fn row_to_record(row: &Row) -> Record {
        Record {
            value: row.value.clone(),
            vector: row.vector.clone(),
            metadata: row.metadata.clone(),
        }
    }
}
