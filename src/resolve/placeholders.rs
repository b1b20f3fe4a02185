//! Placeholder map assembly for template rendering.

use std::collections::HashMap;

use crate::config::ConfigDocument;
use crate::entity::{ActivityCategory, EntityIdentity};
use crate::resolve::precedence::ResolvedMessages;

/// Named substitution values. A key mapped to `None` is present but
/// intentionally blank (renders as the empty string); an absent key
/// leaves its literal `{name}` token in the text.
pub type PlaceholderMap = HashMap<String, Option<String>>;

/// Assemble the substitution map for one presentation.
///
/// Convention: with a category present, the generic `{token}` refers to
/// the category's hashed token, not the entity's. Without one, the
/// application path exposes its raw counter key and the domain path its
/// hashed domain token. `globalPlaceholders` from the document merges
/// last and wins every conflict.
pub fn build_placeholders(
    entity: &EntityIdentity,
    category: Option<&ActivityCategory>,
    selection_id: Option<&str>,
    open_count: i64,
    messages: &ResolvedMessages,
    doc: &ConfigDocument,
    default_message: &str,
) -> PlaceholderMap {
    let mut placeholders = PlaceholderMap::new();
    let mut put = |name: &str, value: Option<String>| {
        placeholders.insert(name.to_string(), value);
    };

    put("applicationOrDomainDisplayName", entity.display_name());
    put("tokenType", Some(token_type(entity, category).to_string()));
    put(
        "familyActivitySelectionId",
        selection_id.map(str::to_string),
    );
    put("shieldOpenCount", Some(open_count.to_string()));
    put(
        "shieldMessage",
        Some(
            messages
                .message
                .clone()
                .unwrap_or_else(|| default_message.to_string()),
        ),
    );
    put("shieldTitleMessage", messages.title.clone());
    put("shieldSubtitleMessage", messages.subtitle.clone());

    match entity {
        EntityIdentity::Application { .. } => {
            put("applicationToken", entity.hashed_token());
            if category.is_none() {
                put("token", Some(entity.stable_key()));
            }
        }
        EntityIdentity::WebDomain { domain, .. } => {
            put("webDomainToken", entity.hashed_token());
            put("domainDisplayName", domain.clone());
            if category.is_none() {
                put("token", entity.hashed_token());
            }
        }
    }

    if let Some(category) = category {
        put("categoryDisplayName", category.display_name.clone());
        put("categoryToken", category.hashed_token());
        put("token", category.hashed_token());
    }

    for (name, value) in &doc.global_placeholders {
        placeholders.insert(name.clone(), value.clone());
    }

    placeholders
}

fn token_type(entity: &EntityIdentity, category: Option<&ActivityCategory>) -> &'static str {
    match (entity, category.is_some()) {
        (EntityIdentity::Application { .. }, false) => "application",
        (EntityIdentity::Application { .. }, true) => "application_category",
        (EntityIdentity::WebDomain { .. }, false) => "web_domain",
        (EntityIdentity::WebDomain { .. }, true) => "web_domain_category",
    }
}
