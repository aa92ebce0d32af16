// SQLite-backed store
// One connection behind a mutex; WAL journal for crash tolerance

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use tracing::{debug, info};

use super::{DocumentSummary, Store, StoreError};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS guild_configs (
    guild_id TEXT PRIMARY KEY,
    config_json TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS ticket_counters (
    guild_id TEXT NOT NULL,
    battalion_key TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (guild_id, battalion_key)
);
";

/// SQLite implementation of [`Store`]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!(
                        "failed to create data directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        info!("Opened ticket database at {}", path.display());
        Self::init(conn)
    }

    /// Private in-memory database, used by tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database mutex poisoned".to_string()))
    }

    /// All stored guild documents, most recently updated first
    pub fn list_documents(&self) -> Result<Vec<DocumentSummary>, StoreError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT guild_id, updated_at FROM guild_configs ORDER BY updated_at DESC")?;
        let rows = stmt.query_map([], |row| {
            Ok(DocumentSummary {
                guild_id: row.get(0)?,
                updated_at: row.get(1)?,
            })
        })?;

        let mut docs = Vec::new();
        for row in rows {
            docs.push(row?);
        }
        Ok(docs)
    }

    /// Stored JSON text for a guild, exactly as written
    pub fn get_raw_document(&self, scope: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT config_json FROM guild_configs WHERE guild_id = ?1",
                params![scope],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(raw)
    }

    /// Upsert raw JSON text after checking that it parses
    pub fn put_raw_document(&self, scope: &str, json: &str) -> Result<(), StoreError> {
        serde_json::from_str::<Value>(json)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.upsert(scope, json)
    }

    fn upsert(&self, scope: &str, json: &str) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO guild_configs (guild_id, config_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(guild_id) DO UPDATE SET
                config_json = excluded.config_json,
                updated_at = excluded.updated_at",
            params![scope, json, now],
        )?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn get_document(&self, scope: &str) -> Result<Option<Value>, StoreError> {
        match self.get_raw_document(scope)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn put_document(&self, scope: &str, document: &Value) -> Result<(), StoreError> {
        let json = serde_json::to_string(document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.upsert(scope, &json)
    }

    fn next_counter(&self, scope: &str, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.lock()?;
        // IMMEDIATE takes the write lock up front so other processes queue behind us
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT OR IGNORE INTO ticket_counters (guild_id, battalion_key, count) VALUES (?1, ?2, 0)",
            params![scope, key],
        )?;
        tx.execute(
            "UPDATE ticket_counters SET count = count + 1 WHERE guild_id = ?1 AND battalion_key = ?2",
            params![scope, key],
        )?;
        let count: i64 = tx.query_row(
            "SELECT count FROM ticket_counters WHERE guild_id = ?1 AND battalion_key = ?2",
            params![scope, key],
            |row| row.get(0),
        )?;
        tx.commit()?;

        debug!(scope, key, count, "Issued ticket number");
        u64::try_from(count)
            .map_err(|_| StoreError::Serialization(format!("negative counter value {}", count)))
    }
}
