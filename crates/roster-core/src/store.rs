//! Student store
//!
//! The `StudentStore` is the durable table of students, keyed by id, with
//! live queries on top.
//!
//! ## Live queries
//!
//! `get_all(order)` returns a [`LiveQuery`]: a watch channel that always holds
//! the latest snapshot of the table in the requested order. Every mutation
//! re-reads the table once per ordering that has subscribers and publishes
//! the new snapshot. Observers that fall behind only see the latest state.
//!
//! ## Usage
//!
//! ```ignore
//! let store = StudentStore::open(&config)?;
//! let mut live = store.get_all(SortOrder::Name)?;
//!
//! store.upsert(&student)?;
//! let students = live.latest();
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{SortOrder, Student, StoredStudent, LOCAL_ID_FLOOR};
use crate::storage::schema::{get_info, init_schema, needs_init, set_info};
use crate::storage::{StorageError, StorageResult};

const LAST_SYNC_KEY: &str = "last_sync_at";

const UPDATE_SQL: &str = r#"
    UPDATE students SET email = ?2, first_name = ?3, last_name = ?4, avatar = ?5
    WHERE id = ?1
"#;

const UPSERT_SQL: &str = r#"
    INSERT INTO students (id, email, first_name, last_name, avatar, sort_order)
    VALUES (?1, ?2, ?3, ?4, ?5, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM students))
    ON CONFLICT(id) DO UPDATE SET
        email = excluded.email,
        first_name = excluded.first_name,
        last_name = excluded.last_name,
        avatar = excluded.avatar
"#;

/// A continuously updated view of all students in one ordering
///
/// Dropping the query unsubscribes it.
#[derive(Debug, Clone)]
pub struct LiveQuery {
    order: SortOrder,
    rx: watch::Receiver<Vec<StoredStudent>>,
}

impl LiveQuery {
    /// The ordering this query was issued with
    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Current snapshot, without marking it as seen
    pub fn current(&self) -> Vec<StoredStudent> {
        self.rx.borrow().clone()
    }

    /// Current snapshot, marking it as seen
    pub fn latest(&mut self) -> Vec<StoredStudent> {
        self.rx.borrow_and_update().clone()
    }

    /// Whether a snapshot was published since the last `latest()`
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next snapshot
    ///
    /// Returns `false` once the store has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

struct Subscriber {
    order: SortOrder,
    tx: watch::Sender<Vec<StoredStudent>>,
}

/// Durable student table with live queries
///
/// All calls are blocking. A single connection guarded by a mutex serializes
/// readers and writers.
pub struct StudentStore {
    conn: Mutex<Connection>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl StudentStore {
    /// Open or create the database described by `config`
    pub fn open(config: &Config) -> StorageResult<Self> {
        let path = config.sqlite_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        let conn = Connection::open(&path).map_err(|source| StorageError::Open {
            path: path.clone(),
            source,
        })?;

        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        debug!("Opened student store at {:?}", path);
        Ok(Self::with_connection(conn))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Run a blocking store call on the blocking thread pool
    ///
    /// Keeps SQLite I/O off the async workers that observers run on.
    pub async fn run<T, F>(self: &Arc<Self>, f: F) -> StorageResult<T>
    where
        F: FnOnce(&StudentStore) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| StorageError::Worker(e.to_string()))?
    }

    // ==================== Queries ====================

    /// Subscribe to all students in `order`
    ///
    /// The returned query already holds the current contents.
    pub fn get_all(&self, order: SortOrder) -> StorageResult<LiveQuery> {
        let conn = self.lock_conn()?;
        let snapshot = query_all(&conn, order)?;
        let (tx, rx) = watch::channel(snapshot);

        let mut subscribers = self.lock_subscribers()?;
        subscribers.push(Subscriber { order, tx });
        debug!(
            "Live query added (order={}, active={})",
            order,
            subscribers.len()
        );

        Ok(LiveQuery { order, rx })
    }

    /// One-shot read of all students in `order`
    pub fn snapshot(&self, order: SortOrder) -> StorageResult<Vec<StoredStudent>> {
        let conn = self.lock_conn()?;
        query_all(&conn, order)
    }

    /// Get a student by id
    pub fn get(&self, id: i64) -> StorageResult<Option<StoredStudent>> {
        let conn = self.lock_conn()?;
        let student = conn
            .query_row(
                "SELECT id, email, first_name, last_name, avatar, sort_order FROM students WHERE id = ?",
                params![id],
                stored_from_row,
            )
            .optional()?;
        Ok(student)
    }

    /// Snapshot of every stored id
    pub fn all_ids(&self) -> StorageResult<HashSet<i64>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT id FROM students")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<HashSet<i64>, _>>()?;
        Ok(ids)
    }

    /// Number of stored students
    pub fn count(&self) -> StorageResult<i64> {
        let conn = self.lock_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Next free id for a locally created student
    ///
    /// Fails with [`StorageError::IdsExhausted`] once `i64::MAX` is stored.
    pub fn next_local_id(&self) -> StorageResult<i64> {
        let conn = self.lock_conn()?;
        let max: Option<i64> =
            conn.query_row("SELECT MAX(id) FROM students", [], |row| row.get(0))?;
        match max {
            None => Ok(LOCAL_ID_FLOOR),
            Some(max_id) => max_id
                .checked_add(1)
                .map(|next| next.max(LOCAL_ID_FLOOR))
                .ok_or(StorageError::IdsExhausted { max_id }),
        }
    }

    /// When the last successful sync finished
    pub fn last_sync_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        let conn = self.lock_conn()?;
        let value = get_info(&conn, LAST_SYNC_KEY)?;
        Ok(value
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis))
    }

    // ==================== Mutations ====================

    /// Insert a student, or replace every field of the stored one with that id
    ///
    /// A new id is stamped with the next insertion position; a replaced
    /// student keeps its position.
    pub fn upsert(&self, student: &Student) -> StorageResult<()> {
        let conn = self.lock_conn()?;
        upsert_row(&conn, student)?;
        debug!("Upserted student {}", student.id);
        self.publish(&conn);
        Ok(())
    }

    /// Replace the fields of a stored student, never inserting
    ///
    /// Returns whether a student with that id existed.
    pub fn update_existing(&self, student: &Student) -> StorageResult<bool> {
        let conn = self.lock_conn()?;
        let updated = conn.execute(
            UPDATE_SQL,
            params![
                student.id,
                student.email,
                student.first_name,
                student.last_name,
                student.avatar,
            ],
        )? > 0;
        if updated {
            debug!("Updated student {}", student.id);
            self.publish(&conn);
        }
        Ok(updated)
    }

    /// Upsert a batch of students in one transaction
    ///
    /// Subscribers see the final state only.
    pub fn upsert_many(&self, students: &[Student]) -> StorageResult<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        for student in students {
            upsert_row(&tx, student)?;
        }
        tx.commit()?;
        debug!("Upserted {} students", students.len());
        self.publish(&conn);
        Ok(())
    }

    /// Delete a student by id
    ///
    /// Returns whether a student was removed. Deleting an unknown id is not
    /// an error.
    pub fn delete_by_id(&self, id: i64) -> StorageResult<bool> {
        let conn = self.lock_conn()?;
        let removed = conn.execute("DELETE FROM students WHERE id = ?", params![id])? > 0;
        if removed {
            debug!("Deleted student {}", id);
            self.publish(&conn);
        }
        Ok(removed)
    }

    /// Remember when a sync finished
    pub fn record_sync(&self, at: DateTime<Utc>) -> StorageResult<()> {
        let conn = self.lock_conn()?;
        set_info(&conn, LAST_SYNC_KEY, &at.timestamp_millis().to_string())?;
        Ok(())
    }

    // ==================== Private helpers ====================

    /// Push fresh snapshots to every live query, pruning dropped ones
    ///
    /// Called with the connection still locked so the snapshot is the state
    /// the mutation produced. The write has already happened, so a failure
    /// here is logged and does not fail the mutation.
    fn publish(&self, conn: &Connection) {
        if let Err(e) = self.try_publish(conn) {
            warn!("Failed to refresh live queries: {}", e);
        }
    }

    fn try_publish(&self, conn: &Connection) -> StorageResult<()> {
        let mut subscribers = self.lock_subscribers()?;
        subscribers.retain(|s| !s.tx.is_closed());

        let mut snapshots: HashMap<SortOrder, Vec<StoredStudent>> = HashMap::new();
        for subscriber in subscribers.iter() {
            if !snapshots.contains_key(&subscriber.order) {
                snapshots.insert(subscriber.order, query_all(conn, subscriber.order)?);
            }
            if let Some(snapshot) = snapshots.get(&subscriber.order) {
                subscriber.tx.send_replace(snapshot.clone());
            }
        }
        Ok(())
    }

    fn lock_conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn lock_subscribers(&self) -> StorageResult<MutexGuard<'_, Vec<Subscriber>>> {
        self.subscribers.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Direct connection access, for tests that damage the schema
    #[cfg(test)]
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StorageResult<T> {
        let conn = self.lock_conn()?;
        Ok(f(&conn)?)
    }
}

fn upsert_row(conn: &Connection, student: &Student) -> rusqlite::Result<usize> {
    conn.execute(
        UPSERT_SQL,
        params![
            student.id,
            student.email,
            student.first_name,
            student.last_name,
            student.avatar,
        ],
    )
}

fn query_all(conn: &Connection, order: SortOrder) -> StorageResult<Vec<StoredStudent>> {
    let sql = format!(
        "SELECT id, email, first_name, last_name, avatar, sort_order FROM students ORDER BY {}",
        order.order_by()
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let students = stmt
        .query_map([], stored_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

fn stored_from_row(row: &Row<'_>) -> rusqlite::Result<StoredStudent> {
    Ok(StoredStudent {
        student: Student {
            id: row.get(0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            avatar: row.get(4)?,
        },
        sort_order: row.get(5)?,
    })
}
