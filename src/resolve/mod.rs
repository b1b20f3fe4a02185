//! The resolution pipeline: one call per shield presentation event.

pub mod placeholders;
pub mod precedence;
pub mod rotation;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::{merge_field_config, ConfigDocument, FieldConfig};
use crate::counter::OpenCounter;
use crate::entity::{ActivityCategory, EntityIdentity};
use crate::log_info;
use crate::store::PrefStore;

pub use placeholders::{build_placeholders, PlaceholderMap};
pub use precedence::{
    resolve_family, resolve_icon_override, resolve_message_triple, resolve_scope, MessageFamily,
    ResolvedMessages,
};
pub use rotation::pick;

const ENABLE_LOGS: bool = false;

/// Store key of the configuration document.
pub const CONFIG_DOC_KEY: &str = "shield.config.v1";

/// Store key of the selection catalog: selection id → member entity keys.
pub const SELECTIONS_KEY: &str = "shield.selections.v1";

/// Shown when no tier supplies a message.
const DEFAULT_SHIELD_MESSAGE: &str = "This activity is blocked right now.";

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Prefix for native field config keys in the store.
    pub field_key_prefix: String,
    /// Key consulted when no selection/category/entity field config exists.
    pub fallback_field_key: String,
    /// Message used when every tier comes up empty.
    pub default_message: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            field_key_prefix: "shield.fields".to_string(),
            fallback_field_key: "shield.fields.default".to_string(),
            default_message: DEFAULT_SHIELD_MESSAGE.to_string(),
        }
    }
}

/// Entry point a shield-rendering collaborator calls per presentation.
///
/// Everything it needs (the configuration document, open counters, the
/// selection catalog, native field configs) lives in the injected
/// store, so the whole pipeline is a bounded synchronous pass over one
/// loaded snapshot.
pub struct ShieldResolver {
    store: Arc<dyn PrefStore>,
    counter: OpenCounter,
    options: ResolverOptions,
}

impl ShieldResolver {
    pub fn new(store: Arc<dyn PrefStore>) -> Self {
        Self::with_options(store, ResolverOptions::default())
    }

    pub fn with_options(store: Arc<dyn PrefStore>, options: ResolverOptions) -> Self {
        let counter = OpenCounter::new(store.clone());
        Self {
            store,
            counter,
            options,
        }
    }

    /// Resolve for one presentation event: bumps the open counter
    /// (debounced) and returns the placeholder map plus the merged
    /// field config for the shield builder.
    pub fn resolve(
        &self,
        entity: &EntityIdentity,
        category: Option<&ActivityCategory>,
        now: DateTime<Utc>,
    ) -> (PlaceholderMap, Option<FieldConfig>) {
        let entity_key = entity.stable_key();
        let open_count = self.counter.bump(&entity_key, now);
        log_info!("resolving shield for {entity_key} (open {open_count})");
        self.resolve_with_count(entity, category, open_count)
    }

    /// Same pipeline over the current count, with no store write. Safe
    /// for previews; calling it twice against an unchanged store yields
    /// identical output.
    pub fn resolve_current(
        &self,
        entity: &EntityIdentity,
        category: Option<&ActivityCategory>,
        now: DateTime<Utc>,
    ) -> (PlaceholderMap, Option<FieldConfig>) {
        let entity_key = entity.stable_key();
        let open_count = self.counter.current(&entity_key, now);
        self.resolve_with_count(entity, category, open_count)
    }

    fn resolve_with_count(
        &self,
        entity: &EntityIdentity,
        category: Option<&ActivityCategory>,
        open_count: i64,
    ) -> (PlaceholderMap, Option<FieldConfig>) {
        let doc = self.load_document();
        let selection_id = self.first_selection_id_matching(entity, category);
        let selection = selection_id.as_deref();

        let messages = resolve_message_triple(&doc, entity, selection, open_count);
        let placeholders = build_placeholders(
            entity,
            category,
            selection,
            open_count,
            &messages,
            &doc,
            &self.options.default_message,
        );

        let icon_override = resolve_icon_override(&doc, entity, selection, open_count);
        let native = self.native_field_config(entity, category, selection);
        let fields = merge_field_config(native, icon_override);

        (placeholders, fields)
    }

    /// Parse the stored configuration document; a missing or malformed
    /// document resolves as empty.
    pub fn load_document(&self) -> ConfigDocument {
        match self.store.get(CONFIG_DOC_KEY) {
            Some(value) => ConfigDocument::from_value(&value),
            None => ConfigDocument::default(),
        }
    }

    /// First selection id whose member list contains the entity's (or
    /// category's) stable key. Ids are scanned in lexicographic order;
    /// the stored JSON object has no order of its own to inherit.
    pub fn first_selection_id_matching(
        &self,
        entity: &EntityIdentity,
        category: Option<&ActivityCategory>,
    ) -> Option<String> {
        let catalog = self.store.get(SELECTIONS_KEY)?;
        let entries = catalog.as_object()?;

        let entity_key = entity.stable_key();
        let category_key = category.map(ActivityCategory::stable_key);

        let mut ids: Vec<&String> = entries.keys().collect();
        ids.sort();

        for id in ids {
            let Some(members) = entries.get(id).and_then(Value::as_array) else {
                continue;
            };
            let contains = |needle: &str| members.iter().any(|m| m.as_str() == Some(needle));

            if contains(&entity_key) {
                return Some(id.clone());
            }
            if let Some(category_key) = &category_key {
                if contains(category_key) {
                    return Some(id.clone());
                }
            }
        }
        None
    }

    /// Native shield field config, first hit wins: selection, category,
    /// entity, then the fallback key. A mistyped stored value falls
    /// through to the next key.
    fn native_field_config(
        &self,
        entity: &EntityIdentity,
        category: Option<&ActivityCategory>,
        selection_id: Option<&str>,
    ) -> Option<FieldConfig> {
        let prefix = &self.options.field_key_prefix;
        let mut keys = Vec::new();

        if let Some(id) = selection_id {
            keys.push(format!("{prefix}.selection.{id}"));
        }
        if let Some(category) = category {
            keys.push(format!("{prefix}.category.{}", category.stable_key()));
        }
        keys.push(format!("{prefix}.entity.{}", entity.stable_key()));
        keys.push(self.options.fallback_field_key.clone());

        for key in keys {
            if let Some(fields) = self.store.get(&key).as_ref().and_then(Value::as_object) {
                return Some(fields.clone());
            }
        }
        None
    }
}
