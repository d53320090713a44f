//! Core types and shared functionality for camdict.
//!
//! This crate provides:
//! - Word cache with SQLite backend
//! - Background task registry for deferred cache writes
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheDb, CacheEntry, DeletedWord, WordListing};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use tasks::{TaskId, TaskOutcome, TaskRegistry, drained};
