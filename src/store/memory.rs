use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use serde_json::Value;

use super::PrefStore;

/// In-memory store for tests and previews. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current contents, for asserting that an
    /// operation left the store untouched.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.data.read().unwrap().clone()
    }
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.data.write().unwrap().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.data.write().unwrap().remove(key);
    }

    fn synchronize(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", json!({"a": 1}));
        assert_eq!(store.get("k"), Some(json!({"a": 1})));

        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_snapshot_reflects_writes() {
        let store = MemoryStore::new();
        store.set("x", json!(1));
        store.set("y", json!("two"));

        let snap = store.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get("y"), Some(&json!("two")));
    }
}
