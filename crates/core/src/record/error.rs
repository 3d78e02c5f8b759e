use thiserror::Error;

use super::AttributeKind;

/// Errors raised while declaring a record mapping or converting through it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Mapping declares an empty table name")]
    EmptyTableName,
    #[error("Mapping for table '{0}' declares no hash key")]
    MissingHashKey(String),
    #[error("Mapping for table '{table}' declares more than one hash key ({first}, {second})")]
    DuplicateHashKey {
        table: String,
        first: String,
        second: String,
    },
    #[error("Mapping declares an empty field or attribute name")]
    EmptyName,
    #[error("Field '{0}' is mapped more than once")]
    DuplicateField(String),
    #[error("Attribute '{0}' is mapped more than once")]
    DuplicateAttribute(String),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Field '{0}' is not declared in the mapping")]
    UndeclaredField(String),
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),
    #[error("'{name}' should be {expected} but is {found}")]
    KindMismatch {
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },
    #[error("Attribute '{name}' holds an invalid number: {value}")]
    InvalidNumber { name: String, value: String },
    #[error("Attribute '{0}' has an unsupported type")]
    UnsupportedType(String),
}
