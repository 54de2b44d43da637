//! Storage layer
//!
//! SQLite schema and typed storage errors. The student table itself is
//! accessed through [`crate::store::StudentStore`].

pub mod error;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
