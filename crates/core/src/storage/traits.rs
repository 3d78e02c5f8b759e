use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::record::{Item, Key, ReadConsistency};
use crate::table::{ProvisionedThroughput, TableDescription, TableSpec};

use super::Result;

/// Item-level access to a key-value store.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Writes an item, replacing any item stored under the same key.
    async fn put_item(&self, table_name: &str, item: Item) -> Result<()>;

    /// Reads an item by key. An absent item is `Ok(None)`.
    async fn get_item(
        &self,
        table_name: &str,
        key: &Key,
        consistency: ReadConsistency,
    ) -> Result<Option<Item>>;

    /// Deletes an item by key. Deleting an absent key succeeds.
    async fn delete_item(&self, table_name: &str, key: &Key) -> Result<()>;
}

/// Table-level administration of a key-value store.
///
/// Every call is a single request; waiting for status changes is left to
/// the caller.
#[async_trait]
pub trait TableAdmin: Send + Sync {
    /// Submits a table creation request.
    async fn create_table(&self, spec: &TableSpec) -> Result<()>;

    /// Fetches table metadata. An absent table is `Ok(None)`.
    async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescription>>;

    /// Submits a provisioned throughput change.
    async fn update_throughput(
        &self,
        table_name: &str,
        throughput: ProvisionedThroughput,
    ) -> Result<()>;

    /// Submits a table deletion request.
    async fn delete_table(&self, table_name: &str) -> Result<()>;

    /// Lazily lists the names of all visible tables.
    ///
    /// Each call starts a fresh listing.
    fn list_tables(&self) -> BoxStream<'_, Result<String>>;
}
