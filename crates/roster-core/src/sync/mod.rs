//! Sync with the remote student directory
//!
//! Fetches the first page of `GET /users?page=<n>` and merges it into the
//! local store.
//!
//! ## Merge policy
//!
//! 1. Fetch page 1 (a failure leaves the store untouched)
//! 2. Snapshot the stored ids
//! 3. Insert the fetched students whose ids are not stored
//!
//! ## Usage
//!
//! ```ignore
//! let fetcher = HttpFetcher::from_config(&config)?;
//! let merger = SyncMerger::new(store, fetcher);
//! let outcome = merger.sync().await?;
//! ```

mod merger;
mod message;
mod remote;

pub use merger::{SyncError, SyncMerger, SyncStatus};
pub use message::{UserPage, FIRST_PAGE};
pub use remote::{FetchError, HttpFetcher, RemoteFetcher};

#[cfg(test)]
pub(crate) use remote::mock;
