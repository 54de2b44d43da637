//! SQLite schema for the local student cache

use rusqlite::{Connection, OptionalExtension, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version and bookkeeping values
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Students table
        CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            avatar TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0
        );

        -- Insertion ordering
        CREATE INDEX IF NOT EXISTS idx_students_sort_order ON students(sort_order);

        -- Name ordering
        CREATE INDEX IF NOT EXISTS idx_students_name ON students(first_name, last_name);
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let version: Option<String> = get_info(conn, "version")?;
    Ok(version.and_then(|v| v.parse().ok()))
}

/// Read a bookkeeping value from `schema_info`
pub fn get_info(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM schema_info WHERE key = ?",
        [key],
        |row| row.get(0),
    )
    .optional()
}

/// Write a bookkeeping value to `schema_info`
pub fn set_info(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES (?, ?)",
        [key, value],
    )?;
    Ok(())
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"students".to_string()));
        assert!(tables.contains(&"schema_info".to_string()));
    }

    #[test]
    fn test_schema_version() {
        let conn = Connection::open_in_memory().unwrap();

        assert!(needs_init(&conn));

        init_schema(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
        assert!(!needs_init(&conn));
    }

    #[test]
    fn test_init_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO students (id, email, first_name, last_name, avatar) VALUES (1, 'a@b.c', 'A', 'B', '')",
            [],
        )
        .unwrap();

        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_sort_order_defaults_to_zero() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO students (id, email, first_name, last_name, avatar) VALUES (1, 'a@b.c', 'A', 'B', '')",
            [],
        )
        .unwrap();

        let sort_order: i64 = conn
            .query_row("SELECT sort_order FROM students WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(sort_order, 0);
    }

    #[test]
    fn test_info_roundtrip() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(get_info(&conn, "last_sync_at").unwrap(), None);
        set_info(&conn, "last_sync_at", "1700000000000").unwrap();
        assert_eq!(
            get_info(&conn, "last_sync_at").unwrap().as_deref(),
            Some("1700000000000")
        );
    }

    #[test]
    fn test_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(indexes.contains(&"idx_students_sort_order".to_string()));
        assert!(indexes.contains(&"idx_students_name".to_string()));
    }
}
