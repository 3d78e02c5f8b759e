//! In-memory store implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use tokio::sync::RwLock;

use dynowalk_core::record::{FieldValue, Item, Key, ReadConsistency};
use dynowalk_core::storage::{ItemStore, Result, StoreError, TableAdmin};
use dynowalk_core::table::{
    AttributeDefinition, ProvisionedThroughput, TableDescription, TableSpec, TableStatus,
};

#[derive(Debug, Clone)]
struct MemoryTable {
    spec: TableSpec,
    status: TableStatus,
    /// Describe calls that still report the transitional status.
    pending_polls: u32,
    items: HashMap<FieldValue, Item>,
}

impl MemoryTable {
    fn describe(&self) -> TableDescription {
        TableDescription {
            table_name: self.spec.table_name.clone(),
            table_arn: Some(format!(
                "arn:aws:dynamodb:local:000000000000:table/{}",
                self.spec.table_name
            )),
            status: self.status.clone(),
            item_count: self.items.len() as i64,
            size_bytes: self.items.values().map(Item::stored_size).sum::<u64>() as i64,
            hash_key: Some(self.spec.hash_key.name.clone()),
            throughput: Some(self.spec.throughput),
            attribute_definitions: vec![AttributeDefinition {
                name: self.spec.hash_key.name.clone(),
                attribute_type: self.spec.hash_key.attribute_type.type_code().to_string(),
            }],
        }
    }

    /// Validates a key against the table's key schema.
    fn check_key(&self, key: &Key) -> Result<()> {
        let hash_key = &self.spec.hash_key;
        if key.attribute != hash_key.name || key.value.kind() != hash_key.attribute_type {
            return Err(StoreError::Fatal(format!(
                "The provided key element does not match the schema of table '{}'",
                self.spec.table_name
            )));
        }
        Ok(())
    }
}

/// In-memory storage backend for tests and dry runs.
///
/// Tables move through the same statuses as DynamoDB tables. Each transition
/// stays visible for `transition_polls` describe calls before it completes,
/// so status waits can be exercised without a network.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<BTreeMap<String, MemoryTable>>>,
    transition_polls: u32,
}

impl InMemoryStore {
    /// Creates a new empty store whose transitions complete on the next describe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many describe calls observe each transitional status.
    pub fn with_transition_polls(mut self, polls: u32) -> Self {
        self.transition_polls = polls;
        self
    }

    async fn with_item_table<T>(
        &self,
        table_name: &str,
        f: impl FnOnce(&mut MemoryTable) -> Result<T>,
    ) -> Result<T> {
        let mut tables = self.tables.write().await;
        match tables.get_mut(table_name) {
            Some(table)
                if matches!(table.status, TableStatus::Active | TableStatus::Updating) =>
            {
                f(table)
            }
            _ => Err(StoreError::table_not_found(table_name)),
        }
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        self.with_item_table(table_name, |table| {
            let hash_key = &table.spec.hash_key;
            let key_value = item
                .get(&hash_key.name)
                .filter(|v| v.kind() == hash_key.attribute_type)
                .cloned()
                .ok_or_else(|| {
                    StoreError::Fatal(format!(
                        "Missing the key {} in the item",
                        hash_key.name
                    ))
                })?;
            table.items.insert(key_value, item);
            Ok(())
        })
        .await
    }

    async fn get_item(
        &self,
        table_name: &str,
        key: &Key,
        _consistency: ReadConsistency,
    ) -> Result<Option<Item>> {
        self.with_item_table(table_name, |table| {
            table.check_key(key)?;
            Ok(table.items.get(&key.value).cloned())
        })
        .await
    }

    async fn delete_item(&self, table_name: &str, key: &Key) -> Result<()> {
        self.with_item_table(table_name, |table| {
            table.check_key(key)?;
            table.items.remove(&key.value);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl TableAdmin for InMemoryStore {
    async fn create_table(&self, spec: &TableSpec) -> Result<()> {
        if spec.throughput.read_capacity_units < 1 || spec.throughput.write_capacity_units < 1 {
            return Err(StoreError::Fatal(
                "Provisioned throughput must be at least 1".to_string(),
            ));
        }

        let mut tables = self.tables.write().await;
        if tables.contains_key(&spec.table_name) {
            return Err(StoreError::table_conflict(
                &spec.table_name,
                "table already exists",
            ));
        }
        tables.insert(
            spec.table_name.clone(),
            MemoryTable {
                spec: spec.clone(),
                status: TableStatus::Creating,
                pending_polls: self.transition_polls,
                items: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescription>> {
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(table_name) else {
            return Ok(None);
        };

        if table.status.is_transitional() {
            if table.pending_polls > 0 {
                table.pending_polls -= 1;
            } else if table.status == TableStatus::Deleting {
                tables.remove(table_name);
                return Ok(None);
            } else {
                table.status = TableStatus::Active;
            }
        }

        Ok(Some(table.describe()))
    }

    async fn update_throughput(
        &self,
        table_name: &str,
        throughput: ProvisionedThroughput,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| StoreError::table_not_found(table_name))?;

        if table.status != TableStatus::Active {
            return Err(StoreError::table_conflict(
                table_name,
                format!("table is {}", table.status),
            ));
        }
        if table.spec.throughput == throughput {
            return Err(StoreError::Fatal(
                "The provisioned throughput for the table will not change".to_string(),
            ));
        }

        table.spec.throughput = throughput;
        table.status = TableStatus::Updating;
        table.pending_polls = self.transition_polls;
        Ok(())
    }

    async fn delete_table(&self, table_name: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| StoreError::table_not_found(table_name))?;

        if table.status.is_transitional() {
            return Err(StoreError::table_conflict(
                table_name,
                format!("table is {}", table.status),
            ));
        }

        table.items.clear();
        table.status = TableStatus::Deleting;
        table.pending_polls = self.transition_polls;
        Ok(())
    }

    fn list_tables(&self) -> BoxStream<'_, Result<String>> {
        let tables = Arc::clone(&self.tables);
        Box::pin(async_stream::stream! {
            let names: Vec<String> = tables.read().await.keys().cloned().collect();
            for name in names {
                yield Ok(name);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynowalk_core::record::AttributeKind;
    use dynowalk_core::table::KeyAttribute;
    use futures_util::TryStreamExt;

    fn person_spec() -> TableSpec {
        TableSpec::new(
            "Person",
            KeyAttribute {
                name: "id".to_string(),
                attribute_type: AttributeKind::Number,
            },
            ProvisionedThroughput::new(5, 5),
        )
    }

    fn person_item(id: i64, name: &str, age: i64) -> Item {
        let mut item = Item::new();
        item.insert("id", FieldValue::Number(id));
        item.insert("name", FieldValue::from(name));
        item.insert("age", FieldValue::Number(age));
        item
    }

    fn key(id: i64) -> Key {
        Key {
            attribute: "id".to_string(),
            value: FieldValue::Number(id),
        }
    }

    async fn active_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.create_table(&person_spec()).await.unwrap();
        store.describe_table("Person").await.unwrap();
        store
    }

    // ==================== Table Lifecycle Tests ====================

    #[tokio::test]
    async fn test_create_then_describe_becomes_active() {
        let store = InMemoryStore::new();
        store.create_table(&person_spec()).await.unwrap();

        let desc = store.describe_table("Person").await.unwrap().unwrap();
        assert_eq!(desc.status, TableStatus::Active);
        assert_eq!(desc.hash_key.as_deref(), Some("id"));
        assert_eq!(desc.throughput, Some(ProvisionedThroughput::new(5, 5)));
        assert_eq!(desc.attribute_definitions[0].attribute_type, "N");
    }

    #[tokio::test]
    async fn test_transition_polls_delay_activation() {
        let store = InMemoryStore::new().with_transition_polls(2);
        store.create_table(&person_spec()).await.unwrap();

        let statuses = [
            store.describe_table("Person").await.unwrap().unwrap().status,
            store.describe_table("Person").await.unwrap().unwrap().status,
            store.describe_table("Person").await.unwrap().unwrap().status,
        ];
        assert_eq!(
            statuses,
            [TableStatus::Creating, TableStatus::Creating, TableStatus::Active]
        );
    }

    #[tokio::test]
    async fn test_create_existing_table_conflicts() {
        let store = active_store().await;
        let result = store.create_table(&person_spec()).await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_describe_missing_table() {
        let store = InMemoryStore::new();
        assert_eq!(store.describe_table("Person").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_throughput() {
        let store = active_store().await;

        store
            .update_throughput("Person", ProvisionedThroughput::new(6, 7))
            .await
            .unwrap();

        let desc = store.describe_table("Person").await.unwrap().unwrap();
        assert_eq!(desc.status, TableStatus::Active);
        assert_eq!(desc.throughput, Some(ProvisionedThroughput::new(6, 7)));
    }

    #[tokio::test]
    async fn test_update_throughput_unchanged_is_rejected() {
        let store = active_store().await;
        let result = store
            .update_throughput("Person", ProvisionedThroughput::new(5, 5))
            .await;
        assert!(matches!(result, Err(StoreError::Fatal(_))));
    }

    #[tokio::test]
    async fn test_update_throughput_while_creating_conflicts() {
        let store = InMemoryStore::new().with_transition_polls(1);
        store.create_table(&person_spec()).await.unwrap();

        let result = store
            .update_throughput("Person", ProvisionedThroughput::new(6, 7))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete_table_then_gone() {
        let store = active_store().await;
        store.delete_table("Person").await.unwrap();

        assert_eq!(store.describe_table("Person").await.unwrap(), None);
        let result = store.delete_table("Person").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_recreate_requires_deletion_to_finish() {
        let store = InMemoryStore::new().with_transition_polls(1);
        store.create_table(&person_spec()).await.unwrap();
        store.describe_table("Person").await.unwrap();
        store.describe_table("Person").await.unwrap();
        store.delete_table("Person").await.unwrap();

        let result = store.create_table(&person_spec()).await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));

        // Deleting, then gone
        assert!(store.describe_table("Person").await.unwrap().is_some());
        assert!(store.describe_table("Person").await.unwrap().is_none());
        store.create_table(&person_spec()).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_tables_is_sorted_and_restartable() {
        let store = InMemoryStore::new();
        for name in ["Person", "Animal", "Zoo"] {
            store
                .create_table(&person_spec().with_table_name(name))
                .await
                .unwrap();
        }

        let first: Vec<String> = store.list_tables().try_collect().await.unwrap();
        let second: Vec<String> = store.list_tables().try_collect().await.unwrap();
        assert_eq!(first, vec!["Animal", "Person", "Zoo"]);
        assert_eq!(first, second);
    }

    // ==================== Item Tests ====================

    #[tokio::test]
    async fn test_put_and_get_item() {
        let store = active_store().await;
        let item = person_item(1, "Derek Smith", 42);

        store.put_item("Person", item.clone()).await.unwrap();

        let retrieved = store
            .get_item("Person", &key(1), ReadConsistency::Eventual)
            .await
            .unwrap();
        assert_eq!(retrieved, Some(item));
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let store = active_store().await;
        store
            .put_item("Person", person_item(1, "Derek Smith", 42))
            .await
            .unwrap();
        store
            .put_item("Person", person_item(1, "Kyle Smith", 42))
            .await
            .unwrap();

        let retrieved = store
            .get_item("Person", &key(1), ReadConsistency::Strong)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.get("name"), Some(&FieldValue::from("Kyle Smith")));

        let desc = store.describe_table("Person").await.unwrap().unwrap();
        assert_eq!(desc.item_count, 1);
        assert!(desc.size_bytes > 0);
    }

    #[tokio::test]
    async fn test_delete_item_is_idempotent() {
        let store = active_store().await;
        store
            .put_item("Person", person_item(1, "Derek Smith", 42))
            .await
            .unwrap();

        store.delete_item("Person", &key(1)).await.unwrap();
        store.delete_item("Person", &key(1)).await.unwrap();
        store.delete_item("Person", &key(99)).await.unwrap();

        let retrieved = store
            .get_item("Person", &key(1), ReadConsistency::Eventual)
            .await
            .unwrap();
        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    async fn test_item_operations_require_active_table() {
        let store = InMemoryStore::new().with_transition_polls(1);
        store.create_table(&person_spec()).await.unwrap();

        let result = store.put_item("Person", person_item(1, "Derek", 42)).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));

        let missing = InMemoryStore::new()
            .get_item("Person", &key(1), ReadConsistency::Eventual)
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_put_item_without_key_is_rejected() {
        let store = active_store().await;
        let mut item = Item::new();
        item.insert("name", FieldValue::from("Nobody"));

        let result = store.put_item("Person", item).await;
        assert!(matches!(result, Err(StoreError::Fatal(_))));
    }

    #[tokio::test]
    async fn test_get_item_with_wrong_key_kind_is_rejected() {
        let store = active_store().await;
        let wrong = Key {
            attribute: "id".to_string(),
            value: FieldValue::from("1"),
        };

        let result = store
            .get_item("Person", &wrong, ReadConsistency::Eventual)
            .await;
        assert!(matches!(result, Err(StoreError::Fatal(_))));
    }
}
