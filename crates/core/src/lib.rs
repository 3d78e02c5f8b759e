//! Core types for dynowalk.
//!
//! Everything here is pure: record mappings, table types, lifecycle
//! planning and formatting, the wait schedule and the storage traits that
//! backends implement. I/O lives in the `dynowalk` crate.

pub mod person;
pub mod record;
pub mod storage;
pub mod table;
