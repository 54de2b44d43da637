//! View coordinator
//!
//! The `ViewCoordinator` sits between a presentation layer and the store. It
//! owns the current sort mode and republishes the matching live query as a
//! single view channel, so observers never resubscribe when the mode flips.
//!
//! ## Observables
//!
//! - `view()`: the student list in the current sort mode
//! - `sort_mode_watch()`: the current sort mode
//! - `loading()`: true while a sync is in flight
//! - `last_error()`: a message for the most recent failure, until cleared
//! - `last_sync_added()`: how many students the last successful sync added
//!
//! All store work runs on the blocking pool. The coordinator must be created
//! inside a Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{SortOrder, Student, StoredStudent, SyncOutcome};
use crate::storage::{StorageError, StorageResult};
use crate::store::{LiveQuery, StudentStore};
use crate::sync::{RemoteFetcher, SyncError, SyncMerger};

/// Shortest interval accepted by [`ViewCoordinator::start_periodic_sync`]
const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(1);

/// How the view is sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    InsertionOrder,
    NameOrder,
}

impl SortMode {
    /// Store ordering backing this mode
    pub fn order(self) -> SortOrder {
        match self {
            SortMode::InsertionOrder => SortOrder::Insertion,
            SortMode::NameOrder => SortOrder::Name,
        }
    }

    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            SortMode::InsertionOrder => SortMode::NameOrder,
            SortMode::NameOrder => SortMode::InsertionOrder,
        }
    }
}

impl From<SortOrder> for SortMode {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Insertion => SortMode::InsertionOrder,
            SortOrder::Name => SortMode::NameOrder,
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::InsertionOrder => write!(f, "insertion order"),
            SortMode::NameOrder => write!(f, "name order"),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn into_students(snapshot: Vec<StoredStudent>) -> Vec<Student> {
    snapshot.into_iter().map(StoredStudent::into_student).collect()
}

/// The published view plus the generation of the query feeding it
///
/// Only the forwarder of the current generation may publish, so a stale
/// query can never overwrite the view after a sort change.
struct ViewFeed {
    tx: watch::Sender<Vec<Student>>,
    generation: Mutex<u64>,
}

impl ViewFeed {
    fn restart(&self, snapshot: Vec<StoredStudent>) -> u64 {
        let mut generation = lock(&self.generation);
        *generation += 1;
        self.tx.send_replace(into_students(snapshot));
        *generation
    }

    fn publish(&self, generation: u64, snapshot: Vec<StoredStudent>) -> bool {
        let current = lock(&self.generation);
        if *current != generation {
            return false;
        }
        self.tx.send_replace(into_students(snapshot));
        true
    }
}

struct Inner<F> {
    store: Arc<StudentStore>,
    merger: SyncMerger<F>,
    sort_mode: watch::Sender<SortMode>,
    sort_gate: tokio::sync::Mutex<()>,
    feed: Arc<ViewFeed>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
    loading: watch::Sender<bool>,
    in_flight: Mutex<usize>,
    last_error: watch::Sender<Option<String>>,
    last_sync_added: watch::Sender<usize>,
    last_removed: Mutex<Option<Student>>,
}

impl<F> Drop for Inner<F> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.forwarder).take() {
            handle.abort();
        }
    }
}

/// Marks a sync as in flight until dropped
struct LoadingGuard<'a> {
    in_flight: &'a Mutex<usize>,
    loading: &'a watch::Sender<bool>,
}

impl<'a> LoadingGuard<'a> {
    fn start(in_flight: &'a Mutex<usize>, loading: &'a watch::Sender<bool>) -> Self {
        let mut count = lock(in_flight);
        *count += 1;
        if *count == 1 {
            loading.send_replace(true);
        }
        Self { in_flight, loading }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut count = lock(self.in_flight);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.loading.send_replace(false);
        }
    }
}

/// Handle to a background sync loop; dropping it stops the loop
#[must_use = "the periodic sync stops when the handle is dropped"]
pub struct PeriodicSync {
    handle: JoinHandle<()>,
    interval: Duration,
}

impl PeriodicSync {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop the loop
    pub fn stop(self) {}
}

impl Drop for PeriodicSync {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Coordinates the sorted view, syncs and edits for one presentation layer
///
/// Cloning is cheap; clones share all state.
pub struct ViewCoordinator<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for ViewCoordinator<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: RemoteFetcher + 'static> ViewCoordinator<F> {
    /// Create a coordinator showing the store in insertion order
    pub fn new(store: Arc<StudentStore>, fetcher: F) -> StorageResult<Self> {
        Self::with_sort_mode(store, fetcher, SortMode::default())
    }

    /// Create a coordinator starting in `mode`
    pub fn with_sort_mode(
        store: Arc<StudentStore>,
        fetcher: F,
        mode: SortMode,
    ) -> StorageResult<Self> {
        let query = store.get_all(mode.order())?;

        let (view, _) = watch::channel(Vec::new());
        let (sort_mode, _) = watch::channel(mode);
        let (loading, _) = watch::channel(false);
        let (last_error, _) = watch::channel(None);
        let (last_sync_added, _) = watch::channel(0);

        let coordinator = Self {
            inner: Arc::new(Inner {
                merger: SyncMerger::new(Arc::clone(&store), fetcher),
                store,
                sort_mode,
                sort_gate: tokio::sync::Mutex::new(()),
                feed: Arc::new(ViewFeed {
                    tx: view,
                    generation: Mutex::new(0),
                }),
                forwarder: Mutex::new(None),
                loading,
                in_flight: Mutex::new(0),
                last_error,
                last_sync_added,
                last_removed: Mutex::new(None),
            }),
        };
        coordinator.attach(query);
        Ok(coordinator)
    }

    // ==================== Observables ====================

    /// Subscribe to the student list in the current sort mode
    pub fn view(&self) -> watch::Receiver<Vec<Student>> {
        self.inner.feed.tx.subscribe()
    }

    /// Current contents of the view
    pub fn students(&self) -> Vec<Student> {
        self.inner.feed.tx.borrow().clone()
    }

    pub fn sort_mode(&self) -> SortMode {
        *self.inner.sort_mode.borrow()
    }

    pub fn sort_mode_watch(&self) -> watch::Receiver<SortMode> {
        self.inner.sort_mode.subscribe()
    }

    /// Subscribe to the in-flight sync flag
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.inner.loading.borrow()
    }

    /// Subscribe to the most recent error message
    pub fn last_error(&self) -> watch::Receiver<Option<String>> {
        self.inner.last_error.subscribe()
    }

    /// Acknowledge the current error
    pub fn clear_error(&self) {
        self.inner.last_error.send_replace(None);
    }

    /// Subscribe to the count of students added by the last successful sync
    pub fn last_sync_added(&self) -> watch::Receiver<usize> {
        self.inner.last_sync_added.subscribe()
    }

    pub fn store(&self) -> &Arc<StudentStore> {
        &self.inner.store
    }

    // ==================== Sorting ====================

    /// Switch between insertion and name order
    ///
    /// Returns the mode in effect afterwards. If the new query cannot be
    /// issued the error is surfaced and the previous mode stays. Concurrent
    /// toggles apply one after another.
    pub async fn toggle_sort(&self) -> SortMode {
        let _gate = self.inner.sort_gate.lock().await;
        let current = self.sort_mode();
        let next = current.toggled();
        let order = next.order();

        match self.inner.store.run(move |store| store.get_all(order)).await {
            Ok(query) => {
                self.attach(query);
                self.inner.sort_mode.send_replace(next);
                info!("View sorted by {}", next);
                next
            }
            Err(e) => {
                self.report(format!("Failed to change sort order: {}", e));
                current
            }
        }
    }

    /// Make `query` the source of the view, retiring the previous one
    fn attach(&self, mut query: LiveQuery) {
        let order = query.order();
        let generation = self.inner.feed.restart(query.latest());
        let feed = Arc::clone(&self.inner.feed);

        let handle = tokio::spawn(async move {
            while query.changed().await {
                if !feed.publish(generation, query.latest()) {
                    break;
                }
            }
        });

        if let Some(previous) = lock(&self.inner.forwarder).replace(handle) {
            previous.abort();
        }
        debug!("View attached to {} query (generation {})", order, generation);
    }

    // ==================== Sync ====================

    /// Fetch the remote directory and merge in new students
    ///
    /// `loading` is true for the duration. On success `last_sync_added` is
    /// updated; on failure the message lands in `last_error` and the store is
    /// left as it was.
    pub async fn sync(&self) -> std::result::Result<SyncOutcome, SyncError> {
        let _loading = LoadingGuard::start(&self.inner.in_flight, &self.inner.loading);
        self.clear_error();

        match self.inner.merger.sync().await {
            Ok(outcome) => {
                self.inner.last_sync_added.send_replace(outcome.added_count);
                Ok(outcome)
            }
            Err(e) => {
                self.report(e.to_string());
                Err(e)
            }
        }
    }

    /// Sync every `interval` until the returned handle is dropped
    ///
    /// The first sync happens one interval from now. Ticks missed while a
    /// sync is running are skipped.
    pub fn start_periodic_sync(&self, interval: Duration) -> PeriodicSync {
        let interval = interval.max(MIN_SYNC_INTERVAL);
        let coordinator = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                debug!("Periodic sync");
                // Failures are already surfaced through last_error
                let _ = coordinator.sync().await;
            }
        });

        info!("Periodic sync every {:?}", interval);
        PeriodicSync { handle, interval }
    }

    // ==================== Edits ====================

    /// Next free id for a locally created student
    pub async fn next_local_id(&self) -> Result<i64> {
        self.run_reported("allocate a student id", |store| store.next_local_id())
            .await
    }

    /// Validate and store a student
    ///
    /// An existing student with the same id is replaced.
    pub async fn add(&self, student: Student) -> Result<()> {
        self.validate(&student)?;
        let id = student.id;
        self.run_reported("add student", move |store| store.upsert(&student))
            .await?;
        debug!("Added student {}", id);
        Ok(())
    }

    /// Replace the stored student with the same id
    ///
    /// Returns `false` without inserting when no such student exists.
    pub async fn update(&self, student: Student) -> Result<bool> {
        self.validate(&student)?;
        let id = student.id;
        let updated = self
            .run_reported("update student", move |store| store.update_existing(&student))
            .await?;

        if !updated {
            debug!("No student {} to update", id);
        }
        Ok(updated)
    }

    /// Delete a student by id, remembering it for [`undo_remove`](Self::undo_remove)
    ///
    /// Returns `false` when nothing was stored under that id.
    pub async fn remove(&self, student: &Student) -> Result<bool> {
        let id = student.id;
        let removed = self
            .run_reported("remove student", move |store| store.delete_by_id(id))
            .await?;

        if removed {
            *lock(&self.inner.last_removed) = Some(student.clone());
            debug!("Removed student {}", id);
        }
        Ok(removed)
    }

    /// Put back the most recently removed student
    ///
    /// Returns the restored student, or `None` if there was nothing to undo.
    pub async fn undo_remove(&self) -> Result<Option<Student>> {
        let Some(student) = lock(&self.inner.last_removed).take() else {
            return Ok(None);
        };

        let restored = student.clone();
        match self
            .run_reported("restore student", move |store| store.upsert(&restored))
            .await
        {
            Ok(()) => {
                debug!("Restored student {}", student.id);
                Ok(Some(student))
            }
            Err(e) => {
                *lock(&self.inner.last_removed) = Some(student);
                Err(e)
            }
        }
    }

    // ==================== Helpers ====================

    fn validate(&self, student: &Student) -> Result<()> {
        student.validate().map_err(|e| {
            self.report(e.to_string());
            Error::from(e)
        })
    }

    async fn run_reported<T, Op>(&self, action: &str, op: Op) -> Result<T>
    where
        Op: FnOnce(&StudentStore) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.store.run(op).await.map_err(|e: StorageError| {
            self.report(format!("Failed to {}: {}", action, e));
            Error::from(e)
        })
    }

    fn report(&self, message: String) {
        warn!("{}", message);
        self.inner.last_error.send_replace(Some(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::mock::{decode_error, ScriptedFetcher};

    const WAIT: Duration = Duration::from_secs(2);

    fn student(id: i64, first: &str, last: &str) -> Student {
        Student::new(id, first, last, format!("{}@reqres.in", first.to_lowercase()))
    }

    fn remote_three() -> Vec<Student> {
        vec![
            student(1, "George", "Bluth"),
            student(2, "Janet", "Weaver"),
            student(3, "Emma", "Wong"),
        ]
    }

    fn coordinator(fetcher: ScriptedFetcher) -> ViewCoordinator<ScriptedFetcher> {
        let store = Arc::new(StudentStore::open_in_memory().unwrap());
        ViewCoordinator::new(store, fetcher).unwrap()
    }

    fn ids(students: &[Student]) -> Vec<i64> {
        students.iter().map(|s| s.id).collect()
    }

    async fn wait_for_view<P>(rx: &mut watch::Receiver<Vec<Student>>, pred: P) -> Vec<Student>
    where
        P: FnMut(&Vec<Student>) -> bool,
    {
        tokio::time::timeout(WAIT, rx.wait_for(pred))
            .await
            .expect("view did not update in time")
            .expect("view closed")
            .to_vec()
    }

    #[tokio::test]
    async fn test_initial_state() {
        let coordinator = coordinator(ScriptedFetcher::new());

        assert!(coordinator.students().is_empty());
        assert_eq!(coordinator.sort_mode(), SortMode::InsertionOrder);
        assert!(!coordinator.is_loading());
        assert!(coordinator.last_error().borrow().is_none());
        assert_eq!(*coordinator.last_sync_added().borrow(), 0);
    }

    #[tokio::test]
    async fn test_initial_view_reflects_store() {
        let store = Arc::new(StudentStore::open_in_memory().unwrap());
        store.upsert(&student(3, "Emma", "Wong")).unwrap();
        store.upsert(&student(1, "George", "Bluth")).unwrap();

        let coordinator =
            ViewCoordinator::with_sort_mode(store, ScriptedFetcher::new(), SortMode::NameOrder)
                .unwrap();

        assert_eq!(ids(&coordinator.students()), vec![3, 1]);
        assert_eq!(coordinator.sort_mode(), SortMode::NameOrder);
    }

    #[tokio::test]
    async fn test_sync_populates_view() {
        let coordinator = coordinator(ScriptedFetcher::new().respond(remote_three()));
        let mut view = coordinator.view();

        let outcome = coordinator.sync().await.unwrap();

        assert_eq!(outcome.added_count, 3);
        assert_eq!(*coordinator.last_sync_added().borrow(), 3);
        assert!(!coordinator.is_loading());
        let students = wait_for_view(&mut view, |v| v.len() == 3).await;
        assert_eq!(ids(&students), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_sync_failure_surfaces_error() {
        let coordinator = coordinator(ScriptedFetcher::new().fail(decode_error()));
        coordinator.store().upsert(&student(4, "Eve", "Holt")).unwrap();

        let err = coordinator.sync().await.unwrap_err();

        assert!(matches!(err, SyncError::Fetch(_)));
        let message = coordinator.last_error().borrow().clone();
        assert!(message.unwrap().starts_with("Sync failed"));
        assert!(!coordinator.is_loading());
        assert_eq!(*coordinator.last_sync_added().borrow(), 0);
        assert_eq!(coordinator.store().count().unwrap(), 1);

        coordinator.clear_error();
        assert!(coordinator.last_error().borrow().is_none());
    }

    #[tokio::test]
    async fn test_sync_clears_previous_error() {
        let coordinator = coordinator(
            ScriptedFetcher::new()
                .fail(decode_error())
                .respond(remote_three()),
        );

        coordinator.sync().await.unwrap_err();
        assert!(coordinator.last_error().borrow().is_some());

        coordinator.sync().await.unwrap();
        assert!(coordinator.last_error().borrow().is_none());
    }

    #[tokio::test]
    async fn test_loading_while_sync_in_flight() {
        let coordinator = coordinator(
            ScriptedFetcher::new()
                .with_delay(Duration::from_millis(100))
                .respond(remote_three()),
        );
        let mut loading = coordinator.loading();

        let background = coordinator.clone();
        let task = tokio::spawn(async move { background.sync().await });

        tokio::time::timeout(WAIT, loading.wait_for(|l| *l))
            .await
            .unwrap()
            .unwrap();
        task.await.unwrap().unwrap();
        assert!(!coordinator.is_loading());
    }

    #[tokio::test]
    async fn test_toggle_sort() {
        let coordinator = coordinator(ScriptedFetcher::new().respond(remote_three()));
        let mut view = coordinator.view();
        coordinator.sync().await.unwrap();
        coordinator.add(student(5, "Charles", "Morris")).await.unwrap();
        let insertion = wait_for_view(&mut view, |v| v.len() == 4).await;
        assert_eq!(ids(&insertion), vec![1, 2, 3, 5]);

        assert_eq!(coordinator.toggle_sort().await, SortMode::NameOrder);
        assert_eq!(ids(&coordinator.students()), vec![5, 3, 1, 2]);
        assert_eq!(*coordinator.sort_mode_watch().borrow(), SortMode::NameOrder);

        assert_eq!(coordinator.toggle_sort().await, SortMode::InsertionOrder);
        assert_eq!(coordinator.students(), insertion);
        assert_eq!(coordinator.store().count().unwrap(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_toggles_both_apply() {
        let coordinator = coordinator(ScriptedFetcher::new().respond(remote_three()));
        coordinator.sync().await.unwrap();
        let mut view = coordinator.view();
        wait_for_view(&mut view, |v| v.len() == 3).await;

        let (first, second) = tokio::join!(coordinator.toggle_sort(), coordinator.toggle_sort());

        let mut modes = vec![first, second];
        modes.sort_by_key(|mode| *mode == SortMode::InsertionOrder);
        assert_eq!(modes, vec![SortMode::NameOrder, SortMode::InsertionOrder]);
        assert_eq!(coordinator.sort_mode(), SortMode::InsertionOrder);
        assert_eq!(ids(&coordinator.students()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_view_follows_store_after_toggle() {
        let coordinator = coordinator(ScriptedFetcher::new());
        let mut view = coordinator.view();
        coordinator.toggle_sort().await;

        coordinator.add(student(10, "Zed", "Last")).await.unwrap();
        coordinator.add(student(11, "Amy", "First")).await.unwrap();

        let students = wait_for_view(&mut view, |v| v.len() == 2).await;
        assert_eq!(ids(&students), vec![11, 10]);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_student() {
        let coordinator = coordinator(ScriptedFetcher::new());

        let err = coordinator
            .add(student(10_000, "", "Nobody"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(coordinator.last_error().borrow().is_some());
        assert_eq!(coordinator.store().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let coordinator = coordinator(ScriptedFetcher::new());
        let store = Arc::clone(coordinator.store());
        store
            .with_conn(|conn| conn.execute_batch("DROP TABLE students"))
            .unwrap();

        let err = coordinator
            .add(student(1, "George", "Bluth"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Storage(StorageError::Database(_))));
        let message = coordinator.last_error().borrow().clone().unwrap();
        assert!(message.starts_with("Failed to add student:"), "{}", message);

        // The coordinator keeps working once the table is back
        store
            .with_conn(crate::storage::schema::init_schema)
            .unwrap();
        coordinator.clear_error();
        let mut view = coordinator.view();
        coordinator.add(student(1, "George", "Bluth")).await.unwrap();

        let students = wait_for_view(&mut view, |v| v.len() == 1).await;
        assert_eq!(ids(&students), vec![1]);
        assert!(coordinator.last_error().borrow().is_none());
    }

    #[tokio::test]
    async fn test_update() {
        let coordinator = coordinator(ScriptedFetcher::new());
        coordinator.add(student(1, "George", "Bluth")).await.unwrap();

        let renamed = student(1, "George", "Michael");
        assert!(coordinator.update(renamed.clone()).await.unwrap());
        assert_eq!(
            coordinator.store().get(1).unwrap().unwrap().student,
            renamed
        );

        assert!(!coordinator.update(student(2, "Janet", "Weaver")).await.unwrap());
        assert!(coordinator.store().get(2).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_and_undo() {
        let coordinator = coordinator(ScriptedFetcher::new().respond(remote_three()));
        let mut view = coordinator.view();
        coordinator.sync().await.unwrap();
        let janet = student(2, "Janet", "Weaver");

        assert!(coordinator.remove(&janet).await.unwrap());
        let students = wait_for_view(&mut view, |v| v.len() == 2).await;
        assert_eq!(ids(&students), vec![1, 3]);

        let restored = coordinator.undo_remove().await.unwrap();
        assert_eq!(restored, Some(janet));
        let students = wait_for_view(&mut view, |v| v.len() == 3).await;
        assert!(ids(&students).contains(&2));

        assert_eq!(coordinator.undo_remove().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_missing_student() {
        let coordinator = coordinator(ScriptedFetcher::new());

        assert!(!coordinator.remove(&student(9, "No", "One")).await.unwrap());
        assert_eq!(coordinator.undo_remove().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_next_local_id() {
        let coordinator = coordinator(ScriptedFetcher::new().respond(remote_three()));
        coordinator.sync().await.unwrap();

        assert_eq!(coordinator.next_local_id().await.unwrap(), crate::LOCAL_ID_FLOOR);
    }

    #[tokio::test]
    async fn test_periodic_sync() {
        let coordinator = coordinator(ScriptedFetcher::new().respond(remote_three()));
        let mut added = coordinator.last_sync_added();

        let periodic = coordinator.start_periodic_sync(Duration::from_millis(10));
        assert_eq!(periodic.interval(), MIN_SYNC_INTERVAL);

        tokio::time::timeout(Duration::from_secs(5), added.wait_for(|n| *n == 3))
            .await
            .unwrap()
            .unwrap();
        periodic.stop();
        assert_eq!(coordinator.store().count().unwrap(), 3);
    }

    #[test]
    fn test_sort_mode() {
        assert_eq!(SortMode::default(), SortMode::InsertionOrder);
        assert_eq!(SortMode::InsertionOrder.toggled(), SortMode::NameOrder);
        assert_eq!(SortMode::NameOrder.order(), SortOrder::Name);
        assert_eq!(SortMode::from(SortOrder::Name), SortMode::NameOrder);
        assert_eq!(SortMode::NameOrder.to_string(), "name order");
    }
}
