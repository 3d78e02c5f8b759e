//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `dynowalk_core::storage`.
//! Transport failures are classified from the outer `SdkError` variant;
//! service errors from the typed per-operation error and, for codes the
//! SDK does not model, from the error metadata.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::delete_table::DeleteTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::list_tables::ListTablesError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::update_table::UpdateTableError;

use dynowalk_core::storage::StoreError;

/// Error codes worth retrying when an operation's error enum does not model them.
const RETRYABLE_CODES: &[&str] = &[
    "ThrottlingException",
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "LimitExceededException",
    "InternalServerError",
    "ServiceUnavailable",
];

/// Classify the non-service `SdkError` variants.
///
/// Returns `None` for `ServiceError`.
fn map_outer_error<E, R>(err: &SdkError<E, R>, operation: &str) -> Option<StoreError>
where
    E: Debug,
    R: Debug,
{
    match err {
        SdkError::DispatchFailure(_) => Some(StoreError::Transient(format!(
            "{} could not reach DynamoDB",
            operation
        ))),
        SdkError::TimeoutError(_) => Some(StoreError::Transient(format!(
            "{} timed out",
            operation
        ))),
        SdkError::ResponseError(_) => Some(StoreError::Transient(format!(
            "{} received an invalid response",
            operation
        ))),
        SdkError::ConstructionFailure(err) => Some(StoreError::Fatal(format!(
            "{} request could not be built: {:?}",
            operation, err
        ))),
        SdkError::ServiceError(_) => None,
        err => Some(StoreError::Fatal(format!(
            "{} failed: {:?}",
            operation, err
        ))),
    }
}

/// Classify a service error by its code.
fn map_error_code<E: ProvideErrorMetadata + Debug>(err: E, operation: &str) -> StoreError {
    let detail = err
        .message()
        .or(err.code())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:?}", err));

    match err.code() {
        Some(code) if RETRYABLE_CODES.contains(&code) => {
            StoreError::Transient(format!("{} failed ({}): {}", operation, code, detail))
        }
        Some(code) => StoreError::Fatal(format!("{} failed ({}): {}", operation, code, detail)),
        None => StoreError::Fatal(format!("{} failed: {}", operation, detail)),
    }
}

/// Map a CreateTable SDK error to StoreError.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(mapped) = map_outer_error(&err, "CreateTable") {
        return mapped;
    }
    match err.into_service_error() {
        CreateTableError::ResourceInUseException(_) => {
            StoreError::table_conflict(table_name, "table already exists")
        }
        CreateTableError::LimitExceededException(_) => {
            StoreError::Transient("Too many table operations in progress, please retry".to_string())
        }
        CreateTableError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => map_error_code(err, "CreateTable"),
    }
}

/// Map a DescribeTable SDK error to StoreError.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(mapped) = map_outer_error(&err, "DescribeTable") {
        return mapped;
    }
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => StoreError::table_not_found(table_name),
        DescribeTableError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => map_error_code(err, "DescribeTable"),
    }
}

/// Map an UpdateTable SDK error to StoreError.
pub fn map_update_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(mapped) = map_outer_error(&err, "UpdateTable") {
        return mapped;
    }
    match err.into_service_error() {
        UpdateTableError::ResourceNotFoundException(_) => StoreError::table_not_found(table_name),
        UpdateTableError::ResourceInUseException(_) => {
            StoreError::table_conflict(table_name, "table is busy")
        }
        UpdateTableError::LimitExceededException(_) => {
            StoreError::Transient("Too many table operations in progress, please retry".to_string())
        }
        UpdateTableError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => map_error_code(err, "UpdateTable"),
    }
}

/// Map a DeleteTable SDK error to StoreError.
pub fn map_delete_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteTableError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(mapped) = map_outer_error(&err, "DeleteTable") {
        return mapped;
    }
    match err.into_service_error() {
        DeleteTableError::ResourceNotFoundException(_) => StoreError::table_not_found(table_name),
        DeleteTableError::ResourceInUseException(_) => {
            StoreError::table_conflict(table_name, "table is busy")
        }
        DeleteTableError::LimitExceededException(_) => {
            StoreError::Transient("Too many table operations in progress, please retry".to_string())
        }
        DeleteTableError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => map_error_code(err, "DeleteTable"),
    }
}

/// Map a ListTables SDK error to StoreError.
pub fn map_list_tables_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ListTablesError, R>,
) -> StoreError {
    if let Some(mapped) = map_outer_error(&err, "ListTables") {
        return mapped;
    }
    match err.into_service_error() {
        ListTablesError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => map_error_code(err, "ListTables"),
    }
}

/// Map a PutItem SDK error to StoreError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(mapped) = map_outer_error(&err, "PutItem") {
        return mapped;
    }
    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => StoreError::table_not_found(table_name),
        PutItemError::ConditionalCheckFailedException(_) => StoreError::Conflict {
            resource: "Item",
            name: table_name.to_string(),
            reason: "condition check failed".to_string(),
        },
        PutItemError::TransactionConflictException(_) => {
            StoreError::Transient("Transaction conflict, please retry".to_string())
        }
        PutItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Transient("Throughput exceeded, please retry".to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            StoreError::Transient("Request limit exceeded, please retry".to_string())
        }
        PutItemError::ThrottlingException(_) => {
            StoreError::Transient("Request throttled, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => map_error_code(err, "PutItem"),
    }
}

/// Map a GetItem SDK error to StoreError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(mapped) = map_outer_error(&err, "GetItem") {
        return mapped;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => StoreError::table_not_found(table_name),
        GetItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Transient("Throughput exceeded, please retry".to_string())
        }
        GetItemError::RequestLimitExceeded(_) => {
            StoreError::Transient("Request limit exceeded, please retry".to_string())
        }
        GetItemError::ThrottlingException(_) => {
            StoreError::Transient("Request throttled, please retry".to_string())
        }
        GetItemError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => map_error_code(err, "GetItem"),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table_name: &str,
) -> StoreError {
    if let Some(mapped) = map_outer_error(&err, "DeleteItem") {
        return mapped;
    }
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => StoreError::table_not_found(table_name),
        DeleteItemError::TransactionConflictException(_) => {
            StoreError::Transient("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Transient("Throughput exceeded, please retry".to_string())
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            StoreError::Transient("Request limit exceeded, please retry".to_string())
        }
        DeleteItemError::ThrottlingException(_) => {
            StoreError::Transient("Request throttled, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => map_error_code(err, "DeleteItem"),
    }
}
