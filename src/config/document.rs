//! Typed configuration document and its degrading parse.
//!
//! The document is authored by the host as loose JSON. Reading it must
//! never abort resolution, so the parse converts "key present but wrong
//! type" into "field absent": a field is taken only when the whole
//! value has the expected shape, the way an `as?` cast would read it.
//! Serialization back out is exact, for hosts that author documents in
//! Rust.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::icon::IconChoice;
use crate::log_warn;

const ENABLE_LOGS: bool = false;

/// Sub-configuration for one precedence tier. An absent field means
/// "inherit from the parent scope", never "empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_messages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_messages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_messages: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_choices: Option<Vec<IconChoice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_icons: Option<bool>,
}

impl ScopedConfig {
    /// Degrading parse; anything that is not an object yields the
    /// all-absent config.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        Self {
            messages: string_array(map, "messages"),
            title_messages: string_array(map, "titleMessages"),
            subtitle_messages: string_array(map, "subtitleMessages"),
            loop_messages: bool_field(map, "loopMessages"),
            icon_choices: icon_array(map, "iconChoices"),
            loop_icons: bool_field(map, "loopIcons"),
        }
    }
}

/// The full layered configuration document.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Root-level fields double as the global fallback tier.
    #[serde(flatten)]
    pub root: ScopedConfig,
    /// User-supplied placeholder overrides; a JSON `null` value means
    /// "present but intentionally blank".
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub global_placeholders: HashMap<String, Option<String>>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub per_app: HashMap<String, ScopedConfig>,
    /// Keys are lowercased at parse; lookups must lowercase the domain.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub per_domain: HashMap<String, ScopedConfig>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub per_selection_id: HashMap<String, ScopedConfig>,
}

impl ConfigDocument {
    /// Degrading parse of the whole document. A missing document parses
    /// from `Value::Null` into the empty document.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                log_warn!("configuration document is not an object; using defaults");
            }
            return Self::default();
        };

        Self {
            root: ScopedConfig::from_value(value),
            global_placeholders: placeholder_map(map, "globalPlaceholders"),
            per_app: scoped_map(map, "perApp", false),
            per_domain: scoped_map(map, "perDomain", true),
            per_selection_id: scoped_map(map, "perSelectionId", false),
        }
    }

    pub fn scope_for_app(&self, bundle_id: &str) -> Option<&ScopedConfig> {
        self.per_app.get(bundle_id)
    }

    pub fn scope_for_domain(&self, lowercase_domain: &str) -> Option<&ScopedConfig> {
        self.per_domain.get(lowercase_domain)
    }

    pub fn scope_for_selection(&self, selection_id: &str) -> Option<&ScopedConfig> {
        self.per_selection_id.get(selection_id)
    }
}

/// Array of strings, taken whole or not at all: one non-string element
/// makes the field absent.
fn string_array(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items = map.get(key)?.as_array()?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn bool_field(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key)?.as_bool()
}

/// Array of `{type, name}` records. The array must be all objects to
/// count; individual records may still parse to `Unrecognized`.
fn icon_array(map: &Map<String, Value>, key: &str) -> Option<Vec<IconChoice>> {
    let items = map.get(key)?.as_array()?;
    if !items.iter().all(Value::is_object) {
        return None;
    }
    Some(items.iter().map(IconChoice::from_value).collect())
}

fn scoped_map(
    map: &Map<String, Value>,
    key: &str,
    lowercase_keys: bool,
) -> HashMap<String, ScopedConfig> {
    let Some(entries) = map.get(key).and_then(Value::as_object) else {
        return HashMap::new();
    };

    entries
        .iter()
        .filter(|(_, value)| value.is_object())
        .map(|(entry_key, value)| {
            let entry_key = if lowercase_keys {
                entry_key.to_lowercase()
            } else {
                entry_key.clone()
            };
            (entry_key, ScopedConfig::from_value(value))
        })
        .collect()
}

/// `globalPlaceholders` entries: strings become values, explicit nulls
/// become intentional blanks, anything else is dropped.
fn placeholder_map(map: &Map<String, Value>, key: &str) -> HashMap<String, Option<String>> {
    let Some(entries) = map.get(key).and_then(Value::as_object) else {
        return HashMap::new();
    };

    entries
        .iter()
        .filter_map(|(name, value)| match value {
            Value::String(text) => Some((name.clone(), Some(text.clone()))),
            Value::Null => Some((name.clone(), None)),
            _ => None,
        })
        .collect()
}
