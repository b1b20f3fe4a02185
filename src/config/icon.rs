//! Icon choice records from the configuration document.

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::merge::FieldConfig;

/// One entry of an `iconChoices` array.
///
/// The `type` string from the document dispatches into a closed set;
/// anything else (including a blank name) lands on `Unrecognized`,
/// which produces no override and makes the resolver skip the tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum IconChoice {
    #[serde(rename = "SFSymbol")]
    SfSymbol { name: String },
    AppGroupRelativePath { name: String },
    AssetName { name: String },
    Unrecognized,
}

impl IconChoice {
    /// Degrading parse of a `{type, name}` record. The name is trimmed;
    /// a missing, mistyped, or whitespace-only name is unrecognized.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::Unrecognized;
        };

        let name = map
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            return Self::Unrecognized;
        }

        match map.get("type").and_then(Value::as_str) {
            Some("SFSymbol") => Self::SfSymbol {
                name: name.to_string(),
            },
            Some("AppGroupRelativePath") => Self::AppGroupRelativePath {
                name: name.to_string(),
            },
            Some("AssetName") => Self::AssetName {
                name: name.to_string(),
            },
            _ => Self::Unrecognized,
        }
    }

    /// The shield field override this choice contributes, or `None` for
    /// an unrecognized choice. App-group paths are stored relative, so
    /// leading slashes are stripped; symbol and asset names pass
    /// through unchanged.
    pub fn override_fields(&self) -> Option<FieldConfig> {
        let (key, name) = match self {
            Self::SfSymbol { name } => ("iconSystemName", name.as_str()),
            Self::AppGroupRelativePath { name } => {
                ("iconAppGroupRelativePath", name.trim_start_matches('/'))
            }
            Self::AssetName { name } => ("iconAssetName", name.as_str()),
            Self::Unrecognized => return None,
        };

        let mut fields = FieldConfig::new();
        fields.insert(key.to_string(), json!(name));
        Some(fields)
    }
}
