//! Storage backend implementations.
//!
//! This module provides concrete implementations of the storage traits
//! defined in `dynowalk_core::storage`.
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB backend using `aws-sdk-dynamodb`
//!
//! The in-memory backend is always compiled. It backs the tests and the
//! `--backend memory` dry run.
//!
//! Build without the AWS SDK:
//! ```bash
//! cargo build -p dynowalk --no-default-features
//! ```

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;

pub use inmemory::InMemoryStore;
