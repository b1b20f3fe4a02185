//! Shield configuration resolution and rotation engine.
//!
//! Given a layered configuration document and a per-entity open count,
//! the engine deterministically picks the message, title, subtitle, and
//! icon override for a blocked app or website shield, and builds the
//! placeholder map for template substitution. Rendering, the extension
//! lifecycle, and platform token internals stay with the host; the
//! engine only needs a [`store::PrefStore`] to read and write.

pub mod config;
pub mod counter;
pub mod entity;
pub mod resolve;
pub mod store;
pub mod template;
pub mod utils;

pub use config::{merge_field_config, ConfigDocument, FieldConfig, IconChoice, ScopedConfig};
pub use counter::OpenCounter;
pub use entity::{stable_hash, ActivityCategory, EntityIdentity, OpaqueToken};
pub use resolve::{
    pick, resolve_family, resolve_icon_override, resolve_message_triple, resolve_scope,
    MessageFamily, PlaceholderMap, ResolvedMessages, ResolverOptions, ShieldResolver,
};
pub use store::{FileStore, MemoryStore, PrefStore, SqliteStore};
pub use template::render_template;
