//! SQLite schema for the embedded link table
//!
//! Mirrors the hosted table: rows keyed by `id`, filtered by `user_id`, and
//! ordered by `created_at`. Required columns reject empty values so the
//! store reports a constraint violation even if validation is bypassed.

use rusqlite::{Connection, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Links table
        CREATE TABLE IF NOT EXISTS links (
            id TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL,
            title TEXT NOT NULL CHECK (length(title) > 0),
            url TEXT NOT NULL CHECK (length(url) > 0),
            category TEXT NOT NULL CHECK (length(category) > 0),
            description TEXT,
            user_id TEXT NOT NULL CHECK (length(user_id) > 0)
        );

        -- Owner listing, newest first
        CREATE INDEX IF NOT EXISTS idx_links_user_created
            ON links(user_id, created_at);
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Check if the schema needs to be initialized
pub fn needs_init(conn: &Connection) -> bool {
    get_schema_version(conn).is_none()
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Option<i32> {
    conn.query_row(
        "SELECT value FROM schema_info WHERE key = 'version'",
        [],
        |row| {
            let value: String = row.get(0)?;
            Ok(value.parse().unwrap_or(0))
        },
    )
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_init(&conn));

        init_schema(&conn).unwrap();

        assert!(!needs_init(&conn));
        assert_eq!(get_schema_version(&conn), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_empty_title_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO links (id, created_at, title, url, category, user_id)
             VALUES ('a', 0, '', 'https://x.com', 'learning', 'alice')",
            [],
        );
        assert!(result.is_err());
    }
}
