//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between SDK types and the core record and
//! table types. These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::error::BuildError;
use aws_sdk_dynamodb::types::{
    self as sdk, AttributeValue, KeySchemaElement, KeyType, ScalarAttributeType,
};

use dynowalk_core::record::{AttributeKind, FieldValue, Item, Key, MappingError};
use dynowalk_core::table::{
    AttributeDefinition, KeyAttribute, ProvisionedThroughput, TableDescription, TableStatus,
};

// ============================================================================
// Item conversions
// ============================================================================

fn to_attribute_value(value: &FieldValue) -> AttributeValue {
    match value {
        FieldValue::Number(n) => AttributeValue::N(n.to_string()),
        FieldValue::String(s) => AttributeValue::S(s.clone()),
    }
}

fn from_attribute_value(name: &str, value: &AttributeValue) -> Result<FieldValue, MappingError> {
    match value {
        AttributeValue::N(n) => n.parse::<i64>().map(FieldValue::Number).map_err(|_| {
            MappingError::InvalidNumber {
                name: name.to_string(),
                value: n.clone(),
            }
        }),
        AttributeValue::S(s) => Ok(FieldValue::String(s.clone())),
        _ => Err(MappingError::UnsupportedType(name.to_string())),
    }
}

/// Convert an item to a DynamoDB attribute map.
pub fn item_to_attributes(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(name, value)| (name, to_attribute_value(&value)))
        .collect()
}

/// Convert a DynamoDB attribute map to an item.
pub fn attributes_to_item(
    attributes: &HashMap<String, AttributeValue>,
) -> Result<Item, MappingError> {
    attributes
        .iter()
        .map(|(name, value)| from_attribute_value(name, value).map(|v| (name.clone(), v)))
        .collect()
}

/// Convert a key to the attribute map used by GetItem and DeleteItem.
pub fn key_to_attributes(key: &Key) -> HashMap<String, AttributeValue> {
    HashMap::from([(key.attribute.clone(), to_attribute_value(&key.value))])
}

// ============================================================================
// Table conversions
// ============================================================================

pub fn scalar_type(kind: AttributeKind) -> ScalarAttributeType {
    match kind {
        AttributeKind::Number => ScalarAttributeType::N,
        AttributeKind::String => ScalarAttributeType::S,
    }
}

/// Hash key schema element for a key attribute.
pub fn hash_key_element(key: &KeyAttribute) -> Result<KeySchemaElement, BuildError> {
    KeySchemaElement::builder()
        .attribute_name(&key.name)
        .key_type(KeyType::Hash)
        .build()
}

/// Attribute definition for a key attribute.
pub fn key_definition(key: &KeyAttribute) -> Result<sdk::AttributeDefinition, BuildError> {
    sdk::AttributeDefinition::builder()
        .attribute_name(&key.name)
        .attribute_type(scalar_type(key.attribute_type))
        .build()
}

pub fn provisioned_throughput(
    throughput: ProvisionedThroughput,
) -> Result<sdk::ProvisionedThroughput, BuildError> {
    sdk::ProvisionedThroughput::builder()
        .read_capacity_units(throughput.read_capacity_units)
        .write_capacity_units(throughput.write_capacity_units)
        .build()
}

pub fn table_status(status: Option<&sdk::TableStatus>) -> TableStatus {
    match status {
        Some(sdk::TableStatus::Active) => TableStatus::Active,
        Some(sdk::TableStatus::Creating) => TableStatus::Creating,
        Some(sdk::TableStatus::Updating) => TableStatus::Updating,
        Some(sdk::TableStatus::Deleting) => TableStatus::Deleting,
        Some(sdk::TableStatus::Archived) => TableStatus::Archived,
        Some(other) => TableStatus::Other(other.as_str().to_string()),
        None => TableStatus::Other("UNKNOWN".to_string()),
    }
}

/// Convert an SDK table description.
///
/// On-demand tables report zero capacity, which is mapped to no throughput.
pub fn to_table_description(table_name: &str, table: &sdk::TableDescription) -> TableDescription {
    let hash_key = table
        .key_schema()
        .iter()
        .find(|k| *k.key_type() == KeyType::Hash)
        .map(|k| k.attribute_name().to_string());

    let throughput = table
        .provisioned_throughput()
        .and_then(|t| {
            Some(ProvisionedThroughput::new(
                t.read_capacity_units()?,
                t.write_capacity_units()?,
            ))
        })
        .filter(|t| t.read_capacity_units > 0 || t.write_capacity_units > 0);

    let attribute_definitions = table
        .attribute_definitions()
        .iter()
        .map(|a| AttributeDefinition {
            name: a.attribute_name().to_string(),
            attribute_type: a.attribute_type().as_str().to_string(),
        })
        .collect();

    TableDescription {
        table_name: table.table_name().unwrap_or(table_name).to_string(),
        table_arn: table.table_arn().map(str::to_string),
        status: table_status(table.table_status()),
        item_count: table.item_count().unwrap_or_default(),
        size_bytes: table.table_size_bytes().unwrap_or_default(),
        hash_key,
        throughput,
        attribute_definitions,
    }
}
