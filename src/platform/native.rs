//! Native persistence (rusqlite)

use crate::kv::KvStore;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

/// Durable key/value store in a single SQLite table.
///
/// Backend failures are logged and swallowed; a failed read looks like a
/// missing key, so callers fall back to defaults.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("opening store at {path}"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "busy_timeout", 250)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv(
              key   TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let Ok(conn) = self.conn.lock() else {
            return Vec::new();
        };
        let rows = conn.prepare("SELECT key FROM kv ORDER BY key").and_then(|mut stmt| {
            let keys = stmt
                .query_map([], |r| r.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>();
            keys
        });
        rows.unwrap_or_else(|e| {
            log::warn!("[store] list keys failed: {e}");
            Vec::new()
        })
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Option<String> {
        let conn = self.conn.lock().ok()?;
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |r| r.get(0))
            .optional()
            .unwrap_or_else(|e| {
                log::warn!("[store] get {key} failed: {e}");
                None
            })
    }

    fn set(&self, key: &str, value: &str) {
        let Ok(conn) = self.conn.lock() else { return };
        if let Err(e) = conn.execute(
            "INSERT INTO kv(key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        ) {
            log::warn!("[store] set {key} failed: {e}");
        }
    }

    fn remove(&self, key: &str) {
        let Ok(conn) = self.conn.lock() else { return };
        if let Err(e) = conn.execute("DELETE FROM kv WHERE key = ?1", params![key]) {
            log::warn!("[store] remove {key} failed: {e}");
        }
    }
}
