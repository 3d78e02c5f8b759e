//! Table schema and state types (Functional Core - pure data).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::AttributeKind;

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeKind,
}

/// Read and write capacity units provisioned for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedThroughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

impl ProvisionedThroughput {
    pub fn new(read_capacity_units: i64, write_capacity_units: i64) -> Self {
        Self {
            read_capacity_units,
            write_capacity_units,
        }
    }
}

impl fmt::Display for ProvisionedThroughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.read_capacity_units, self.write_capacity_units
        )
    }
}

/// Everything needed to create a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub table_name: String,
    pub hash_key: KeyAttribute,
    pub throughput: ProvisionedThroughput,
}

impl TableSpec {
    pub fn new(
        table_name: impl Into<String>,
        hash_key: KeyAttribute,
        throughput: ProvisionedThroughput,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            hash_key,
            throughput,
        }
    }

    /// Sets the table name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }
}

/// Table status as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    Archived,
    Other(String),
}

impl TableStatus {
    /// Whether the table is in the middle of a create, update or delete.
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            TableStatus::Creating | TableStatus::Updating | TableStatus::Deleting
        )
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Creating => f.write_str("CREATING"),
            TableStatus::Active => f.write_str("ACTIVE"),
            TableStatus::Updating => f.write_str("UPDATING"),
            TableStatus::Deleting => f.write_str("DELETING"),
            TableStatus::Archived => f.write_str("ARCHIVED"),
            TableStatus::Other(status) => f.write_str(status),
        }
    }
}

/// An attribute definition reported by a table description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    /// Raw type code (`S`, `N`, `B`).
    pub attribute_type: String,
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    pub table_name: String,
    pub table_arn: Option<String>,
    pub status: TableStatus,
    pub item_count: i64,
    pub size_bytes: i64,
    /// Hash key attribute name, if the description carried a key schema.
    pub hash_key: Option<String>,
    pub throughput: Option<ProvisionedThroughput>,
    pub attribute_definitions: Vec<AttributeDefinition>,
}

impl TableDescription {
    /// The hash key as a typed key attribute, resolved through the attribute definitions.
    pub fn hash_key_attribute(&self) -> Option<KeyAttribute> {
        let name = self.hash_key.as_deref()?;
        let definition = self
            .attribute_definitions
            .iter()
            .find(|a| a.name == name)?;
        Some(KeyAttribute {
            name: name.to_string(),
            attribute_type: AttributeKind::from_type_code(&definition.attribute_type)?,
        })
    }
}
