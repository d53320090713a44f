//! SQLite-backed cache of fetched dictionary pages.
//!
//! This module provides a persistent word cache using SQLite with async
//! access via tokio-rusqlite. It supports:
//!
//! - Point lookup by input word, response word or response URL
//! - Insert-only writes with duplicate-key rejection
//! - Lazy creation of the `words` table
//! - Listing, random sampling and explicit removal

pub mod connection;
pub mod schema;
pub mod words;

pub use crate::Error;

pub use connection::CacheDb;
pub use words::{CacheEntry, DeletedWord, WordListing};
