mod error;
mod mapping;
mod types;

pub use error::MappingError;
pub use mapping::{FieldMapping, Record, RecordMapping, RecordMappingBuilder};
pub use types::{AttributeKind, FieldValue, Fields, Item, Key, ReadConsistency};
