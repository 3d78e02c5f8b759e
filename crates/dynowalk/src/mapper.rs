//! Typed record access on top of an [`ItemStore`].

use std::marker::PhantomData;
use std::sync::Arc;

use dynowalk_core::record::{FieldValue, MappingError, ReadConsistency, Record, RecordMapping};
use dynowalk_core::storage::{ItemStore, Result};
use dynowalk_core::table::{ProvisionedThroughput, TableSpec};

/// Saves, loads and deletes records of type `R`.
///
/// The mapping is validated once when the mapper is built, so a malformed
/// declaration fails before any request is sent.
pub struct RecordMapper<R> {
    store: Arc<dyn ItemStore>,
    mapping: RecordMapping,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RecordMapper<R> {
    pub fn new(store: Arc<dyn ItemStore>) -> std::result::Result<Self, MappingError> {
        Ok(Self {
            store,
            mapping: RecordMapping::of::<R>()?,
            _record: PhantomData,
        })
    }

    /// Stores records in a differently named table.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.mapping = self.mapping.with_table_name(name);
        self
    }

    pub fn table_name(&self) -> &str {
        self.mapping.table_name()
    }

    /// The table a store needs to hold these records.
    pub fn table_spec(&self, throughput: ProvisionedThroughput) -> TableSpec {
        TableSpec::new(
            self.mapping.table_name(),
            self.mapping.key_attribute(),
            throughput,
        )
    }

    /// Writes the record, replacing any record with the same hash key.
    pub async fn save(&self, record: &R) -> Result<()> {
        let item = self.mapping.to_item(&record.to_fields())?;
        tracing::debug!(table = %self.table_name(), attributes = item.len(), "Saving record");
        self.store.put_item(self.table_name(), item).await
    }

    /// Reads a record by hash key value.
    pub async fn load(
        &self,
        hash_key: impl Into<FieldValue>,
        consistency: ReadConsistency,
    ) -> Result<Option<R>> {
        let key = self.mapping.key(hash_key.into())?;
        tracing::debug!(table = %self.table_name(), %key, ?consistency, "Loading record");

        match self.store.get_item(self.table_name(), &key, consistency).await? {
            Some(item) => {
                let fields = self.mapping.from_item(&item)?;
                Ok(Some(R::from_fields(&fields)?))
            }
            None => Ok(None),
        }
    }

    /// Deletes the record with the same hash key. Absent records are not an error.
    pub async fn delete(&self, record: &R) -> Result<()> {
        let key = self.mapping.key_of(&record.to_fields())?;
        tracing::debug!(table = %self.table_name(), %key, "Deleting record");
        self.store.delete_item(self.table_name(), &key).await
    }
}
