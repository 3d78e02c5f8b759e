//! DynamoDB store implementation.
//!
//! Implements the storage traits from `dynowalk_core::storage` with one SDK
//! request per call.

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use futures_util::stream::BoxStream;

use dynowalk_core::record::{Item, Key, ReadConsistency};
use dynowalk_core::storage::{ItemStore, Result, StoreError, TableAdmin};
use dynowalk_core::table::{ProvisionedThroughput, TableDescription, TableSpec};

use super::conversions::{
    attributes_to_item, hash_key_element, item_to_attributes, key_definition, key_to_attributes,
    provisioned_throughput, to_table_description,
};
use super::error::{
    map_create_table_error, map_delete_item_error, map_delete_table_error,
    map_describe_table_error, map_get_item_error, map_list_tables_error, map_put_item_error,
    map_update_table_error,
};

fn build_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::Fatal(format!("Invalid request: {}", err))
}

/// DynamoDB-backed store.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

// ============================================================================
// ItemStore implementation
// ============================================================================

#[async_trait]
impl ItemStore for DynamoDbStore {
    async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item_to_attributes(item)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, table_name))?;

        Ok(())
    }

    async fn get_item(
        &self,
        table_name: &str,
        key: &Key,
        consistency: ReadConsistency,
    ) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(key_to_attributes(key)))
            .consistent_read(consistency.is_strong())
            .send()
            .await
            .map_err(|e| map_get_item_error(e, table_name))?;

        match result.item {
            Some(item) => Ok(Some(attributes_to_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn delete_item(&self, table_name: &str, key: &Key) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(key_to_attributes(key)))
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, table_name))?;

        Ok(())
    }
}

// ============================================================================
// TableAdmin implementation
// ============================================================================

#[async_trait]
impl TableAdmin for DynamoDbStore {
    async fn create_table(&self, spec: &TableSpec) -> Result<()> {
        self.client
            .create_table()
            .table_name(&spec.table_name)
            .key_schema(hash_key_element(&spec.hash_key).map_err(build_error)?)
            .attribute_definitions(key_definition(&spec.hash_key).map_err(build_error)?)
            .provisioned_throughput(provisioned_throughput(spec.throughput).map_err(build_error)?)
            .send()
            .await
            .map_err(|e| map_create_table_error(e, &spec.table_name))?;

        Ok(())
    }

    async fn describe_table(&self, table_name: &str) -> Result<Option<TableDescription>> {
        let result = self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await;

        match result {
            Ok(response) => Ok(response
                .table()
                .map(|table| to_table_description(table_name, table))),
            Err(err) => match map_describe_table_error(err, table_name) {
                StoreError::NotFound { .. } => Ok(None),
                err => Err(err),
            },
        }
    }

    async fn update_throughput(
        &self,
        table_name: &str,
        throughput: ProvisionedThroughput,
    ) -> Result<()> {
        self.client
            .update_table()
            .table_name(table_name)
            .provisioned_throughput(provisioned_throughput(throughput).map_err(build_error)?)
            .send()
            .await
            .map_err(|e| map_update_table_error(e, table_name))?;

        Ok(())
    }

    async fn delete_table(&self, table_name: &str) -> Result<()> {
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_delete_table_error(e, table_name))?;

        Ok(())
    }

    fn list_tables(&self) -> BoxStream<'_, Result<String>> {
        let mut names = self.client.list_tables().into_paginator().items().send();
        Box::pin(async_stream::stream! {
            while let Some(name) = names.next().await {
                yield name.map_err(map_list_tables_error);
            }
        })
    }
}
