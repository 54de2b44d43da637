//! Roster Core Library
//!
//! This crate provides the core functionality for Roster, an offline-first
//! student roster backed by a local SQLite cache and a remote user directory.
//!
//! # Architecture
//!
//! - **SQLite**: The local store is the source of truth for what is shown
//! - **Remote directory**: Only ever adds students the store has never seen
//!
//! Views are live queries: every write republishes the affected orderings, so
//! observers never poll.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let store = Arc::new(StudentStore::open(&config)?);
//! let coordinator = ViewCoordinator::new(store, HttpFetcher::from_config(&config)?)?;
//!
//! coordinator.sync().await?;
//! let students = coordinator.students();
//! ```
//!
//! # Modules
//!
//! - `store`: Student table with live queries (main entry point)
//! - `coordinator`: Sorted view, loading and error state for a presentation layer
//! - `sync`: Remote fetcher and one-directional merge
//! - `models`: Data structures for students and orderings
//! - `storage`: SQLite schema and storage errors
//! - `config`: Application configuration

pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;
pub mod sync;

pub use config::Config;
pub use coordinator::{PeriodicSync, SortMode, ViewCoordinator};
pub use error::Error;
pub use models::{
    SortOrder, StoredStudent, Student, SyncOutcome, ValidationError, LOCAL_ID_FLOOR,
};
pub use storage::{StorageError, StorageResult};
pub use store::{LiveQuery, StudentStore};
pub use sync::{FetchError, HttpFetcher, RemoteFetcher, SyncError, SyncMerger};
