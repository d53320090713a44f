//! Unified error types for camdict.

use tokio_rusqlite::rusqlite;

/// Unified error types shared by the cache, fetcher and lookup pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an empty word).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Schema creation failed.
    #[error("CACHE_ERROR: schema setup failed: {0}")]
    SchemaFailed(String),

    /// Insert collided with an existing `response_word` or `response_url`.
    #[error("DUPLICATE_KEY: {0}")]
    DuplicateKey(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure for a single attempt.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Response body exceeds the configured size limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Every attempt inside one fetcher session failed.
    #[error("RETRIES_EXHAUSTED: {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted { url: String, attempts: u32, last_error: String },

    /// Document could not be parsed as expected.
    #[error("PARSE_FAILED: {0}")]
    ParseFailed(String),

    /// The fetched page carries no dictionary entry.
    #[error("ENTRY_NOT_FOUND: {0}")]
    EntryNotFound(String),

    /// A background task panicked or was cancelled.
    #[error("TASK_FAILED: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Whether this error is the duplicate-key rejection from a cache insert.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::DuplicateKey(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(e, msg) = &err
            && e.code == rusqlite::ErrorCode::ConstraintViolation
        {
            return Error::DuplicateKey(msg.clone().unwrap_or_else(|| e.to_string()));
        }
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RetriesExhausted {
            url: "https://dictionary.cambridge.org/dictionary/english/test".to_string(),
            attempts: 3,
            last_error: "connection reset".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("RETRIES_EXHAUSTED"));
        assert!(msg.contains("after 3 attempts"));
    }

    #[test]
    fn test_constraint_violation_maps_to_duplicate_key() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            Some("UNIQUE constraint failed: words.response_word".to_string()),
        );
        let err = Error::from(sqlite_err);
        assert!(err.is_duplicate_key());
        assert!(err.to_string().contains("words.response_word"));
    }

    #[test]
    fn test_fetch_too_large_display() {
        let err = Error::FetchTooLarge("6291456 bytes exceeds 5242880".to_string());
        assert_eq!(err.to_string(), "FETCH_TOO_LARGE: 6291456 bytes exceeds 5242880");
    }

    #[test]
    fn test_other_sqlite_errors_stay_database() {
        let err = Error::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, Error::Database(_)));
    }
}
