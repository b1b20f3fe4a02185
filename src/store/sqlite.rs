use std::{
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{bail, Context, Result};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::PrefStore;
use crate::log_error;

const ENABLE_LOGS: bool = true;

const CURRENT_SCHEMA_VERSION: i32 = 1;

fn run_migrations(conn: &mut Connection) -> Result<()> {
    let mut version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "store version ({}) is newer than supported schema ({})",
            version,
            CURRENT_SCHEMA_VERSION
        );
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;

    while version < CURRENT_SCHEMA_VERSION {
        let next_version = version + 1;
        match next_version {
            1 => {
                tx.execute_batch(
                    "CREATE TABLE IF NOT EXISTS kv (
                         key TEXT PRIMARY KEY,
                         value TEXT NOT NULL
                     );",
                )
                .context("failed to create kv table")?;
            }
            other => bail!("no migration registered for version {other}"),
        }
        version = next_version;
    }

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")?;

    Ok(())
}

/// SQLite-backed store: one `kv` table holding JSON-serialized values.
///
/// The connection is synchronous behind a `Mutex`; resolution is a
/// single bounded pipeline per invocation, so there is nothing to
/// overlap. Writers in separate processes are serialized by SQLite
/// itself, but callers must not rely on that: the `PrefStore` contract
/// stays best-effort.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }

        let mut conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open store at {}", db_path.display()))?;

        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            error!("Failed to enable WAL mode: {err}");
        }
        if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
            error!("Failed to enable foreign keys: {err}");
        }

        run_migrations(&mut conn).context("failed to run store migrations")?;

        info!("Preference store opened at {}", db_path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl PrefStore for SqliteStore {
    fn get(&self, key: &str) -> Option<Value> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .unwrap_or_default();

        raw.and_then(|text| serde_json::from_str(&text).ok())
    }

    fn set(&self, key: &str, value: Value) {
        let serialized = match serde_json::to_string(&value) {
            Ok(text) => text,
            Err(err) => {
                log_error!("dropped write for key '{key}': {err}");
                return;
            }
        };

        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, serialized],
        );
        if let Err(err) = result {
            log_error!("dropped write for key '{key}': {err}");
        }
    }

    fn remove(&self, key: &str) {
        let conn = self.conn.lock().unwrap();
        if let Err(err) = conn.execute("DELETE FROM kv WHERE key = ?1", params![key]) {
            log_error!("dropped removal for key '{key}': {err}");
        }
    }

    fn synchronize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("PRAGMA wal_checkpoint(PASSIVE)", [], |_| Ok(()))
            .context("failed to checkpoint WAL")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let store = SqliteStore::new(path.clone()).unwrap();
        store.set("shield.opens.2026-08-06.app:com.x", json!(4));
        store.set("doc", json!({"messages": ["a", "b"]}));
        drop(store);

        let reopened = SqliteStore::new(path).unwrap();
        assert_eq!(
            reopened.get("shield.opens.2026-08-06.app:com.x"),
            Some(json!(4))
        );
        assert_eq!(reopened.get("doc"), Some(json!({"messages": ["a", "b"]})));
    }

    #[test]
    fn test_overwrite_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("store.db")).unwrap();

        store.set("k", json!(1));
        store.set("k", json!(2));
        assert_eq!(store.get("k"), Some(json!(2)));

        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_newer_schema_refuses_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION + 1)
                .unwrap();
        }

        assert!(SqliteStore::new(path).is_err());
    }
}
