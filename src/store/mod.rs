//! Shared preference store the engine reads and writes.
//!
//! Everything the engine persists (the configuration document, open
//! counters, the selection catalog, native field configs) goes through
//! the `PrefStore` trait so tests can run against an in-memory store
//! while the host wires a file- or SQLite-backed one.

use anyhow::Result;
use serde_json::Value;

mod file;
mod memory;
mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key-value store with JSON values and get/set/synchronize semantics.
///
/// Read and write paths absorb backend failures into absence (a missing
/// value, a dropped write) rather than surfacing errors: a blocking
/// shield must always render something. Only construction and
/// `synchronize` report failures.
pub trait PrefStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value);

    fn remove(&self, key: &str);

    /// Bring the store and its backing medium in sync. For the file
    /// store this re-reads the file (another process may have written
    /// it); for SQLite it checkpoints the WAL; for memory it is a no-op.
    fn synchronize(&self) -> Result<()>;
}
