//! Word entry operations.
//!
//! Point lookup by any of the three lookup keys, insert-only writes, listing
//! and explicit removal.

use super::connection::CacheDb;
use super::schema::{create_words_table, is_missing_table};
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached dictionary page.
///
/// `response_word` and `response_url` are each unique across the table.
/// Rows are never updated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub input_word: String,
    pub response_word: String,
    pub response_url: String,
    pub response_text: String,
    pub created_at: String,
}

impl CacheEntry {
    /// Build an entry stamped with the current time.
    pub fn new(
        input_word: impl Into<String>, response_word: impl Into<String>, response_url: impl Into<String>,
        response_text: impl Into<String>,
    ) -> Self {
        Self {
            input_word: input_word.into(),
            response_word: response_word.into(),
            response_url: response_url.into(),
            response_text: response_text.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A cached response word with its insertion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordListing {
    pub response_word: String,
    pub created_at: String,
}

/// What a successful [`CacheDb::delete_word`] removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedWord {
    pub input_word: String,
    pub response_url: String,
    pub rows: u64,
}

impl CacheDb {
    /// Find a cached entry for a word or its request URL.
    ///
    /// Matches when `response_url = request_url`, `response_word = word` or
    /// `input_word = word`. Several rows may share an input word; the earliest
    /// inserted one wins. A missing table is created on the spot and reported
    /// as a miss.
    pub async fn lookup(&self, request_url: &str, word: &str) -> Result<Option<CacheEntry>, Error> {
        let request_url = request_url.to_string();
        let word = word.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = match conn.prepare(
                    "SELECT input_word, response_word, response_url, response_text, created_at
                     FROM words
                     WHERE response_url = ?1 OR response_word = ?2 OR input_word = ?2
                     ORDER BY rowid ASC
                     LIMIT 1",
                ) {
                    Ok(stmt) => stmt,
                    Err(e) if is_missing_table(&e) => {
                        create_words_table(conn)?;
                        return Ok(None);
                    }
                    Err(e) => return Err(e.into()),
                };

                let result = stmt.query_row(params![request_url, word], |row| {
                    Ok(CacheEntry {
                        input_word: row.get(0)?,
                        response_word: row.get(1)?,
                        response_url: row.get(2)?,
                        response_text: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert a new entry.
    ///
    /// Never overwrites: a collision on `response_word` or `response_url`
    /// returns [`Error::DuplicateKey`] and leaves the existing row untouched.
    pub async fn insert(&self, entry: &CacheEntry) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let insert = |conn: &rusqlite::Connection| {
                    conn.execute(
                        "INSERT INTO words (input_word, response_word, created_at, response_url, response_text)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            &entry.input_word,
                            &entry.response_word,
                            &entry.created_at,
                            &entry.response_url,
                            &entry.response_text,
                        ],
                    )
                };

                match insert(&*conn) {
                    Ok(_) => Ok(()),
                    Err(e) if is_missing_table(&e) => {
                        create_words_table(conn)?;
                        insert(&*conn)?;
                        Ok(())
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// All cached response words in insertion order.
    pub async fn list_words(&self) -> Result<Vec<WordListing>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<WordListing>, Error> {
                let mut stmt = match conn.prepare("SELECT response_word, created_at FROM words ORDER BY rowid ASC") {
                    Ok(stmt) => stmt,
                    Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
                    Err(e) => return Err(e.into()),
                };
                let rows = stmt
                    .query_map([], |row| Ok(WordListing { response_word: row.get(0)?, created_at: row.get(1)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }

    /// Up to `limit` response words in random order.
    pub async fn random_words(&self, limit: usize) -> Result<Vec<String>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = match conn.prepare("SELECT response_word FROM words ORDER BY RANDOM() LIMIT ?1") {
                    Ok(stmt) => stmt,
                    Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
                    Err(e) => return Err(e.into()),
                };
                let words = stmt
                    .query_map(params![limit], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(words)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every row whose input word or response word equals `word`.
    ///
    /// Returns `None` when nothing matched.
    pub async fn delete_word(&self, word: &str) -> Result<Option<DeletedWord>, Error> {
        let word = word.to_string();
        self.conn
            .call(move |conn| -> Result<Option<DeletedWord>, Error> {
                let found = conn.query_row(
                    "SELECT input_word, response_url FROM words
                     WHERE input_word = ?1 OR response_word = ?1
                     ORDER BY rowid ASC LIMIT 1",
                    params![word],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                );

                let (input_word, response_url) = match found {
                    Ok(pair) => pair,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) if is_missing_table(&e) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let rows = conn.execute("DELETE FROM words WHERE input_word = ?1 OR response_word = ?1", params![word])?;

                Ok(Some(DeletedWord { input_word, response_url, rows: rows as u64 }))
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached rows.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                match conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get::<_, i64>(0)) {
                    Ok(n) => Ok(n as u64),
                    Err(e) if is_missing_table(&e) => Ok(0),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}
