//! Catalog table definition.

use crate::db::DbResult;
use rusqlite::Connection;

/// `genres` holds a JSON array of strings.
const BOOKS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS books (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    pages INTEGER NOT NULL CHECK (pages > 0),
    price REAL NOT NULL CHECK (price > 0),
    genres TEXT NOT NULL
);";

/// Creates the `books` table when it does not exist yet.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(BOOKS_TABLE_SQL)?;
    Ok(())
}

/// Returns whether the `books` table is present.
pub fn books_table_exists(conn: &Connection) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'books'
        );",
        [],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
