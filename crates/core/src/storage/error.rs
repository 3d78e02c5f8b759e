use thiserror::Error;

use crate::record::MappingError;

/// Errors that can occur during store operations.
///
/// The set is closed so callers can decide between retrying and aborting
/// without inspecting messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{resource} not found: {name}")]
    NotFound {
        resource: &'static str,
        name: String,
    },
    #[error("{resource} '{name}' conflicts: {reason}")]
    Conflict {
        resource: &'static str,
        name: String,
        reason: String,
    },
    #[error("Transient failure: {0}")]
    Transient(String),
    #[error("Operation failed: {0}")]
    Fatal(String),
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),
    #[error("Timed out waiting for table '{table}' after {attempts} attempts")]
    Timeout { table: String, attempts: u32 },
    #[error("Wait cancelled")]
    Cancelled,
}

impl StoreError {
    /// Table absent where one was required.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        StoreError::NotFound {
            resource: "Table",
            name: name.into(),
        }
    }

    /// Table exists or is busy in a way that blocks the request.
    pub fn table_conflict(name: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Conflict {
            resource: "Table",
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether repeating the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_) | StoreError::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_not_found_display() {
        let error = StoreError::table_not_found("Person");
        assert_eq!(error.to_string(), "Table not found: Person");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_store_error_conflict_display() {
        let error = StoreError::table_conflict("Person", "table already exists");
        assert_eq!(
            error.to_string(),
            "Table 'Person' conflicts: table already exists"
        );
    }

    #[test]
    fn test_store_error_timeout_display() {
        let error = StoreError::Timeout {
            table: "Person".to_string(),
            attempts: 60,
        };
        assert_eq!(
            error.to_string(),
            "Timed out waiting for table 'Person' after 60 attempts"
        );
    }

    #[test]
    fn test_store_error_from_mapping_error() {
        let error: StoreError = MappingError::MissingAttribute("age".to_string()).into();
        assert_eq!(error.to_string(), "Mapping error: Missing attribute: age");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(StoreError::Transient("throttled".to_string()).is_retryable());
        assert!(StoreError::Timeout {
            table: "Person".to_string(),
            attempts: 1
        }
        .is_retryable());
        assert!(!StoreError::Fatal("validation".to_string()).is_retryable());
        assert!(!StoreError::Cancelled.is_retryable());
        assert!(!StoreError::table_not_found("Person").is_retryable());
    }
}
