//! Sync merger
//!
//! Pulls the first page of the remote directory and inserts the students
//! whose ids are not stored yet.
//!
//! The merge is one-directional: a stored student is never overwritten by a
//! remote one with the same id, so local edits survive a re-sync. Upstream
//! changes to an id that is already stored are not picked up, and a deleted
//! remote student comes back on the next sync.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::message::FIRST_PAGE;
use super::remote::{FetchError, RemoteFetcher};
use crate::models::{Student, SyncOutcome};
use crate::storage::StorageError;
use crate::store::StudentStore;

/// Errors that abort a sync
#[derive(Error, Debug)]
pub enum SyncError {
    /// Fetching failed; the store was not touched
    #[error("Sync failed: {0}")]
    Fetch(#[from] FetchError),

    /// Reading the stored ids failed; the store was not touched
    #[error("Sync failed: {0}")]
    Storage(#[from] StorageError),
}

/// Merger status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No sync running
    Idle,
    /// Waiting for the remote page
    Fetching,
    /// Writing new students
    Merging,
}

/// Merges remote pages into the local store
pub struct SyncMerger<F> {
    store: Arc<StudentStore>,
    fetcher: F,
    /// Held for the whole diff-then-insert window
    gate: Mutex<()>,
    status: watch::Sender<SyncStatus>,
}

impl<F: RemoteFetcher> SyncMerger<F> {
    pub fn new(store: Arc<StudentStore>, fetcher: F) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            store,
            fetcher,
            gate: Mutex::new(()),
            status,
        }
    }

    /// Get the current status
    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    /// Subscribe to status changes
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch page 1 and insert every student whose id is not stored yet
    ///
    /// Concurrent calls run one after another; a later call sees the
    /// students the earlier one inserted.
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let _gate = self.gate.lock().await;
        let result = self.sync_locked().await;
        self.status.send_replace(SyncStatus::Idle);
        result
    }

    async fn sync_locked(&self) -> Result<SyncOutcome, SyncError> {
        self.status.send_replace(SyncStatus::Fetching);
        let page = match self.fetcher.fetch_page(FIRST_PAGE).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Fetching students failed: {}", e);
                return Err(e.into());
            }
        };

        self.status.send_replace(SyncStatus::Merging);
        let fetched = page.data;
        let (fetched, added_count) = self
            .store
            .run(move |store| merge_new(store, &fetched).map(|added| (fetched, added)))
            .await?;

        info!(
            "Sync complete: fetched={}, added={}",
            fetched.len(),
            added_count
        );
        Ok(SyncOutcome {
            fetched,
            added_count,
        })
    }
}

/// Insert the students of `fetched` whose ids are absent from `store`
///
/// Inserts are best effort: a failed insert is logged and not counted.
/// Returns the number of students inserted.
pub(crate) fn merge_new(store: &StudentStore, fetched: &[Student]) -> Result<usize, StorageError> {
    let existing: HashSet<i64> = store.all_ids()?;
    debug!("Existing student ids: {}", existing.len());

    let mut added = 0;
    for student in fetched.iter().filter(|s| !existing.contains(&s.id)) {
        match store.upsert(student) {
            Ok(()) => {
                debug!("Inserted remote student {}", student.id);
                added += 1;
            }
            Err(e) => warn!("Failed to insert remote student {}: {}", student.id, e),
        }
    }

    if let Err(e) = store.record_sync(Utc::now()) {
        warn!("Failed to record sync time: {}", e);
    }

    Ok(added)
}
