// SQLite-backed key/value store for client-side state.
//
// Holds the persisted login session (`kmrl_user`) and the demo upload cache
// (`kmrl_uploads`). Values are stored as raw text so callers decide how to
// handle content that no longer parses.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Key holding the JSON-encoded `UserSession`.
pub const SESSION_KEY: &str = "kmrl_user";

/// Key holding the JSON array of recently uploaded documents.
pub const UPLOADS_KEY: &str = "kmrl_uploads";

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the store at `path`. Pass `":memory:"` for an
    /// ephemeral store.
    pub fn open(path: &str) -> Result<Self> {
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create store directory {}", parent.display())
                    })?;
                }
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set store pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS local_storage (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );",
        )
        .context("failed to create store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    /// Write `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value      = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![key, value],
        )
        .with_context(|| format!("failed to write store key {key}"))?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT value FROM local_storage WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("failed to read store key {key}"))
    }

    /// Delete `key`. Returns `true` if a value was present.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.conn();
        let removed = conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])
            .with_context(|| format!("failed to delete store key {key}"))?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> Store {
        Store::open(":memory:").expect("in-memory store should open")
    }

    #[test]
    fn get_missing_key_is_none() {
        let store = test_store();
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let store = test_store();
        store.set(SESSION_KEY, r#"{"userId":"FIN007"}"#).unwrap();
        assert_eq!(
            store.get(SESSION_KEY).unwrap().as_deref(),
            Some(r#"{"userId":"FIN007"}"#)
        );
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = test_store();
        store.set(UPLOADS_KEY, "[]").unwrap();
        store.set(UPLOADS_KEY, "[1]").unwrap();
        assert_eq!(store.get(UPLOADS_KEY).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn remove_reports_presence() {
        let store = test_store();
        store.set(SESSION_KEY, "x").unwrap();
        assert!(store.remove(SESSION_KEY).unwrap());
        assert!(!store.remove(SESSION_KEY).unwrap());
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn keys_are_independent() {
        let store = test_store();
        store.set(SESSION_KEY, "session").unwrap();
        store.set(UPLOADS_KEY, "uploads").unwrap();
        store.remove(SESSION_KEY).unwrap();
        assert_eq!(store.get(UPLOADS_KEY).unwrap().as_deref(), Some("uploads"));
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = std::env::temp_dir().join("docusphere_store_reopen");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("store.db");
        let path_str = path.to_str().unwrap();

        {
            let store = Store::open(path_str).unwrap();
            store.set(SESSION_KEY, "kept").unwrap();
        }
        let store = Store::open(path_str).unwrap();
        assert_eq!(store.get(SESSION_KEY).unwrap().as_deref(), Some("kept"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
