use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::MappingError;

/// The stored type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Stored as a DynamoDB number (`N`).
    Number,
    /// Stored as a DynamoDB string (`S`).
    String,
}

impl AttributeKind {
    /// Returns the DynamoDB scalar type code (`N` or `S`).
    pub fn type_code(&self) -> &'static str {
        match self {
            AttributeKind::Number => "N",
            AttributeKind::String => "S",
        }
    }

    /// Parses a DynamoDB scalar type code.
    pub fn from_type_code(code: &str) -> Option<Self> {
        match code {
            "N" => Some(AttributeKind::Number),
            "S" => Some(AttributeKind::String),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_code())
    }
}

/// A single scalar value held by a record field or stored attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldValue {
    Number(i64),
    String(String),
}

impl FieldValue {
    /// Returns the kind this value is stored as.
    pub fn kind(&self) -> AttributeKind {
        match self {
            FieldValue::Number(_) => AttributeKind::Number,
            FieldValue::String(_) => AttributeKind::String,
        }
    }

    /// Approximate number of bytes the value occupies once stored.
    ///
    /// Strings count their UTF-8 length. Numbers count one byte per two
    /// significant digits plus one, which is how DynamoDB sizes them.
    pub fn stored_size(&self) -> u64 {
        match self {
            FieldValue::String(s) => s.len() as u64,
            FieldValue::Number(n) => {
                let digits = n.unsigned_abs().to_string().trim_end_matches('0').len().max(1);
                (digits as u64).div_ceil(2) + 1
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

/// Record values keyed by field name.
///
/// This is the in-process side of a record. [`RecordMapping`](super::RecordMapping)
/// translates it into an [`Item`] keyed by stored attribute names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field value, replacing any previous value.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.0.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Gets a required number field.
    pub fn number(&self, field: &str) -> Result<i64, MappingError> {
        match self.0.get(field) {
            Some(FieldValue::Number(n)) => Ok(*n),
            Some(other) => Err(MappingError::KindMismatch {
                name: field.to_string(),
                expected: AttributeKind::Number,
                found: other.kind(),
            }),
            None => Err(MappingError::MissingField(field.to_string())),
        }
    }

    /// Gets a required string field.
    pub fn string(&self, field: &str) -> Result<String, MappingError> {
        match self.0.get(field) {
            Some(FieldValue::String(s)) => Ok(s.clone()),
            Some(other) => Err(MappingError::KindMismatch {
                name: field.to_string(),
                expected: AttributeKind::String,
                found: other.kind(),
            }),
            None => Err(MappingError::MissingField(field.to_string())),
        }
    }
}

/// A stored item: attribute values keyed by stored attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item(BTreeMap<String, FieldValue>);

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: FieldValue) {
        self.0.insert(attribute.into(), value);
    }

    pub fn get(&self, attribute: &str) -> Option<&FieldValue> {
        self.0.get(attribute)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Approximate stored size of the item: attribute names plus values.
    pub fn stored_size(&self) -> u64 {
        self.0
            .iter()
            .map(|(name, value)| name.len() as u64 + value.stored_size())
            .sum()
    }
}

impl FromIterator<(String, FieldValue)> for Item {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Item {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The primary key of a stored item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub attribute: String,
    pub value: FieldValue,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

/// Read consistency preference for a single lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadConsistency {
    #[default]
    Eventual,
    Strong,
}

impl ReadConsistency {
    /// Whether the store should be asked for a strongly consistent read.
    pub fn is_strong(&self) -> bool {
        matches!(self, ReadConsistency::Strong)
    }
}
