//! Lazy schema creation for the `words` table.
//!
//! The table is not created when the database is opened. Instead, the first
//! statement that fails with SQLite's "no such table" error creates it and the
//! caller carries on as if the table had been empty.

use tokio_rusqlite::rusqlite;

/// DDL for the words table and its input-word index.
pub const WORDS_SCHEMA: &str = include_str!("../../sql/words.sql");

/// Whether a rusqlite error was caused by the `words` table not existing yet.
pub fn is_missing_table(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.starts_with("no such table"),
        _ => false,
    }
}

/// Create the words table (idempotent).
pub fn create_words_table(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    tracing::info!("creating words table");
    conn.execute_batch(WORDS_SCHEMA)
}

/// Whether the words table is present.
pub fn has_words_table(conn: &rusqlite::Connection) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='words')",
        [],
        |row| row.get(0),
    )
}
