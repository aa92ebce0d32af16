// Persistent storage for guild configuration documents and ticket counters

pub mod sqlite;

use serde_json::Value;
use thiserror::Error;

pub use sqlite::SqliteStore;

/// Errors raised at the storage boundary
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A required argument (scope or key) was missing or empty
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The underlying database could not be reached or failed mid-operation
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A stored document is not valid JSON
    #[error("stored document is malformed: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Listing entry for a stored guild document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub guild_id: String,
    /// Epoch milliseconds of the last write
    pub updated_at: i64,
}

/// Durable key-value tables backing the config store and the counters.
///
/// Every method is a blocking call; async callers run them on the blocking
/// pool. Implementations must make `put_document` a single atomic write and
/// `next_counter` a single transaction so that concurrent callers for the
/// same `(scope, key)` never observe the same value.
pub trait Store: Send + Sync + 'static {
    /// Fetch the stored document for a guild, `None` if never written
    fn get_document(&self, scope: &str) -> Result<Option<Value>, StoreError>;

    /// Insert or replace the document for a guild
    fn put_document(&self, scope: &str, document: &Value) -> Result<(), StoreError>;

    /// Create the counter at 0 if absent, increment it and return the new value
    fn next_counter(&self, scope: &str, key: &str) -> Result<u64, StoreError>;
}
