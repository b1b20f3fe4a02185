use std::{fs, path::PathBuf, sync::RwLock};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::PrefStore;
use crate::log_error;

const ENABLE_LOGS: bool = true;

/// JSON-file-backed store: one flat object, persisted on every write.
///
/// Loading is lenient: a missing, unreadable, or malformed file opens as
/// an empty store. Writes persist immediately so a short-lived extension
/// invocation never has to remember to flush.
pub struct FileStore {
    path: PathBuf,
    data: RwLock<Map<String, Value>>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }

        let data = Self::read_map(&path);

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read_map(path: &PathBuf) -> Map<String, Value> {
        if path.exists() {
            let contents = fs::read_to_string(path).unwrap_or_default();
            serde_json::from_str::<Value>(&contents)
                .ok()
                .and_then(|value| match value {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .unwrap_or_default()
        } else {
            Map::new()
        }
    }

    fn persist(&self, data: &Map<String, Value>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&Value::Object(data.clone()))?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write store to {}", self.path.display()))
    }
}

impl PrefStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let guard_result = {
            let mut guard = self.data.write().unwrap();
            guard.insert(key.to_string(), value);
            self.persist(&guard)
        };
        if let Err(err) = guard_result {
            log_error!("dropped write for key '{key}': {err:#}");
        }
    }

    fn remove(&self, key: &str) {
        let guard_result = {
            let mut guard = self.data.write().unwrap();
            guard.remove(key);
            self.persist(&guard)
        };
        if let Err(err) = guard_result {
            log_error!("dropped removal for key '{key}': {err:#}");
        }
    }

    fn synchronize(&self) -> Result<()> {
        let data = Self::read_map(&self.path);
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }
}
