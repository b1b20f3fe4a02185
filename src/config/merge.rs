//! Shallow merge of shield field configurations.

use serde_json::{Map, Value};

/// Loose field configuration for the native shield appearance (colors,
/// titles, icon fields). Kept untyped: the set of fields belongs to the
/// rendering collaborator, the engine only layers them.
pub type FieldConfig = Map<String, Value>;

/// Merge an override into a base configuration without discarding
/// unset fields.
///
/// Single-level, field-by-field: every key present in the override
/// replaces the base value whole; keys absent from the override are
/// preserved. A `None` or empty override returns the base unchanged,
/// including a `None` base.
pub fn merge_field_config(
    base: Option<FieldConfig>,
    overlay: Option<FieldConfig>,
) -> Option<FieldConfig> {
    let overlay = match overlay {
        Some(overlay) if !overlay.is_empty() => overlay,
        _ => return base,
    };

    let mut merged = base.unwrap_or_default();
    for (key, value) in overlay {
        merged.insert(key, value);
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> FieldConfig {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_override_replaces_only_its_keys() {
        let merged = merge_field_config(
            Some(config(json!({"a": 1, "b": 2}))),
            Some(config(json!({"b": 3}))),
        );
        assert_eq!(merged, Some(config(json!({"a": 1, "b": 3}))));
    }

    #[test]
    fn test_nil_base_takes_override() {
        let merged = merge_field_config(None, Some(config(json!({"a": 1}))));
        assert_eq!(merged, Some(config(json!({"a": 1}))));
    }

    #[test]
    fn test_nil_or_empty_override_returns_base() {
        let base = config(json!({"a": 1}));
        assert_eq!(
            merge_field_config(Some(base.clone()), None),
            Some(base.clone())
        );
        assert_eq!(
            merge_field_config(Some(base.clone()), Some(FieldConfig::new())),
            Some(base)
        );
        assert_eq!(merge_field_config(None, None), None);
    }

    #[test]
    fn test_replacement_is_whole_value_not_deep() {
        let merged = merge_field_config(
            Some(config(json!({"nested": {"keep": true, "old": 1}}))),
            Some(config(json!({"nested": {"new": 2}}))),
        );
        assert_eq!(merged, Some(config(json!({"nested": {"new": 2}}))));
    }
}
