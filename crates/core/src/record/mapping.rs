//! Declared field-to-attribute mappings (Functional Core - pure data).
//!
//! A record type declares its table, its hash key and the stored attribute
//! behind every field once. The mapping is validated when built, so every
//! later conversion can rely on it being well formed.

use std::collections::HashSet;

use crate::table::KeyAttribute;

use super::{AttributeKind, FieldValue, Fields, Item, Key, MappingError};

/// One field of a record and the attribute it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub field: String,
    pub attribute: String,
    pub kind: AttributeKind,
}

impl FieldMapping {
    pub fn new(field: impl Into<String>, attribute: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            field: field.into(),
            attribute: attribute.into(),
            kind,
        }
    }
}

/// A record type that can be persisted through a [`RecordMapping`].
pub trait Record: Sized + Send + Sync {
    /// Declares the table, hash key and attributes for this record type.
    fn mapping() -> RecordMappingBuilder;

    /// Returns the record's values keyed by field name.
    fn to_fields(&self) -> Fields;

    /// Rebuilds a record from values keyed by field name.
    fn from_fields(fields: &Fields) -> Result<Self, MappingError>;
}

/// Builder for [`RecordMapping`]. Nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct RecordMappingBuilder {
    table_name: String,
    hash_keys: Vec<FieldMapping>,
    attributes: Vec<FieldMapping>,
}

impl RecordMappingBuilder {
    /// Declares the hash key field.
    pub fn hash_key(
        mut self,
        field: impl Into<String>,
        attribute: impl Into<String>,
        kind: AttributeKind,
    ) -> Self {
        self.hash_keys.push(FieldMapping::new(field, attribute, kind));
        self
    }

    /// Declares a non-key attribute.
    pub fn attribute(
        mut self,
        field: impl Into<String>,
        attribute: impl Into<String>,
        kind: AttributeKind,
    ) -> Self {
        self.attributes.push(FieldMapping::new(field, attribute, kind));
        self
    }

    /// Validates the declaration and produces the mapping.
    pub fn build(self) -> Result<RecordMapping, MappingError> {
        if self.table_name.trim().is_empty() {
            return Err(MappingError::EmptyTableName);
        }

        let mut hash_keys = self.hash_keys.into_iter();
        let hash_key = hash_keys
            .next()
            .ok_or_else(|| MappingError::MissingHashKey(self.table_name.clone()))?;
        if let Some(second) = hash_keys.next() {
            return Err(MappingError::DuplicateHashKey {
                table: self.table_name,
                first: hash_key.field,
                second: second.field,
            });
        }

        let mut fields = HashSet::new();
        let mut attributes = HashSet::new();
        for mapping in std::iter::once(&hash_key).chain(self.attributes.iter()) {
            if mapping.field.is_empty() || mapping.attribute.is_empty() {
                return Err(MappingError::EmptyName);
            }
            if !fields.insert(mapping.field.as_str()) {
                return Err(MappingError::DuplicateField(mapping.field.clone()));
            }
            if !attributes.insert(mapping.attribute.as_str()) {
                return Err(MappingError::DuplicateAttribute(mapping.attribute.clone()));
            }
        }

        Ok(RecordMapping {
            table_name: self.table_name,
            hash_key,
            attributes: self.attributes,
        })
    }
}

/// A validated mapping between a record type and its stored items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMapping {
    table_name: String,
    hash_key: FieldMapping,
    attributes: Vec<FieldMapping>,
}

impl RecordMapping {
    /// Starts declaring a mapping for the given table.
    pub fn builder(table_name: impl Into<String>) -> RecordMappingBuilder {
        RecordMappingBuilder {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Builds and validates the mapping declared by `R`.
    pub fn of<R: Record>() -> Result<Self, MappingError> {
        R::mapping().build()
    }

    /// Points the mapping at a different table.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn hash_key(&self) -> &FieldMapping {
        &self.hash_key
    }

    /// All mapped fields, hash key first.
    pub fn fields(&self) -> impl Iterator<Item = &FieldMapping> {
        std::iter::once(&self.hash_key).chain(self.attributes.iter())
    }

    /// The key schema a table needs to hold these records.
    pub fn key_attribute(&self) -> KeyAttribute {
        KeyAttribute {
            name: self.hash_key.attribute.clone(),
            attribute_type: self.hash_key.kind,
        }
    }

    /// Builds the stored key for a hash key value, checking its kind.
    pub fn key(&self, value: FieldValue) -> Result<Key, MappingError> {
        if value.kind() != self.hash_key.kind {
            return Err(MappingError::KindMismatch {
                name: self.hash_key.field.clone(),
                expected: self.hash_key.kind,
                found: value.kind(),
            });
        }
        Ok(Key {
            attribute: self.hash_key.attribute.clone(),
            value,
        })
    }

    /// Extracts the stored key from a record's fields.
    pub fn key_of(&self, fields: &Fields) -> Result<Key, MappingError> {
        let value = fields
            .get(&self.hash_key.field)
            .cloned()
            .ok_or_else(|| MappingError::MissingField(self.hash_key.field.clone()))?;
        self.key(value)
    }

    /// Converts record fields into a stored item.
    pub fn to_item(&self, fields: &Fields) -> Result<Item, MappingError> {
        if let Some((undeclared, _)) = fields
            .iter()
            .find(|(name, _)| !self.fields().any(|m| m.field == *name))
        {
            return Err(MappingError::UndeclaredField(undeclared.to_string()));
        }

        let mut item = Item::new();
        for mapping in self.fields() {
            let value = fields
                .get(&mapping.field)
                .ok_or_else(|| MappingError::MissingField(mapping.field.clone()))?;
            if value.kind() != mapping.kind {
                return Err(MappingError::KindMismatch {
                    name: mapping.field.clone(),
                    expected: mapping.kind,
                    found: value.kind(),
                });
            }
            item.insert(mapping.attribute.clone(), value.clone());
        }
        Ok(item)
    }

    /// Converts a stored item back into record fields.
    ///
    /// Attributes the mapping does not declare are ignored.
    pub fn from_item(&self, item: &Item) -> Result<Fields, MappingError> {
        let mut fields = Fields::new();
        for mapping in self.fields() {
            let value = item
                .get(&mapping.attribute)
                .ok_or_else(|| MappingError::MissingAttribute(mapping.attribute.clone()))?;
            if value.kind() != mapping.kind {
                return Err(MappingError::KindMismatch {
                    name: mapping.attribute.clone(),
                    expected: mapping.kind,
                    found: value.kind(),
                });
            }
            fields.insert(mapping.field.clone(), value.clone());
        }
        Ok(fields)
    }
}
