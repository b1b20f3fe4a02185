//! Tiered precedence resolution over the configuration document.
//!
//! Most specific scope first: per-selection, then per-app or
//! per-domain, then the document root. A tier wins a field only when it
//! has a non-empty relevant array; a tier that merely exists does not
//! shadow the tiers below it.

use crate::config::{ConfigDocument, FieldConfig, ScopedConfig};
use crate::entity::EntityIdentity;
use crate::resolve::rotation::pick;

/// One overridable message array family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFamily {
    Messages,
    TitleMessages,
    SubtitleMessages,
}

impl MessageFamily {
    fn array<'a>(&self, scope: &'a ScopedConfig) -> Option<&'a [String]> {
        match self {
            Self::Messages => scope.messages.as_deref(),
            Self::TitleMessages => scope.title_messages.as_deref(),
            Self::SubtitleMessages => scope.subtitle_messages.as_deref(),
        }
    }
}

/// Message, title, and subtitle picked for one presentation. `None`
/// members render as intentionally blank; the default shield message is
/// applied later, at placeholder build time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedMessages {
    pub message: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

/// Tiers for message/title/subtitle text. Web domain text resolves
/// from per-domain and global scope only; the selection tier
/// participates in the field/icon path, not here.
fn message_tiers<'a>(
    doc: &'a ConfigDocument,
    entity: &EntityIdentity,
    selection_id: Option<&str>,
) -> Vec<&'a ScopedConfig> {
    let mut tiers = Vec::new();

    if !entity.is_web_domain() {
        if let Some(scope) = selection_id.and_then(|id| doc.scope_for_selection(id)) {
            tiers.push(scope);
        }
    }
    push_entity_tier(&mut tiers, doc, entity);
    tiers.push(&doc.root);
    tiers
}

/// Tiers for the icon/native-field path: all three tiers for both
/// entity kinds.
fn field_tiers<'a>(
    doc: &'a ConfigDocument,
    entity: &EntityIdentity,
    selection_id: Option<&str>,
) -> Vec<&'a ScopedConfig> {
    let mut tiers = Vec::new();

    if let Some(scope) = selection_id.and_then(|id| doc.scope_for_selection(id)) {
        tiers.push(scope);
    }
    push_entity_tier(&mut tiers, doc, entity);
    tiers.push(&doc.root);
    tiers
}

fn push_entity_tier<'a>(
    tiers: &mut Vec<&'a ScopedConfig>,
    doc: &'a ConfigDocument,
    entity: &EntityIdentity,
) {
    match entity {
        EntityIdentity::Application { .. } => {
            if let Some(scope) = entity.bundle_id().and_then(|id| doc.scope_for_app(id)) {
                tiers.push(scope);
            }
        }
        EntityIdentity::WebDomain { .. } => {
            if let Some(scope) = entity
                .lowercase_domain()
                .and_then(|domain| doc.scope_for_domain(&domain))
            {
                tiers.push(scope);
            }
        }
    }
}

fn loop_messages(doc: &ConfigDocument, tier: &ScopedConfig) -> bool {
    tier.loop_messages.or(doc.root.loop_messages).unwrap_or(true)
}

fn loop_icons(doc: &ConfigDocument, tier: &ScopedConfig) -> bool {
    tier.loop_icons.or(doc.root.loop_icons).unwrap_or(true)
}

/// The most specific scope that exists for the entity, falling back to
/// the document root.
pub fn resolve_scope<'a>(
    doc: &'a ConfigDocument,
    entity: &EntityIdentity,
    selection_id: Option<&str>,
) -> &'a ScopedConfig {
    field_tiers(doc, entity, selection_id)
        .first()
        .copied()
        .unwrap_or(&doc.root)
}

/// Resolve one message family on its own: each family walks the tiers
/// independently, so a tier may supply titles without claiming the
/// subtitles of a less specific tier.
pub fn resolve_family(
    doc: &ConfigDocument,
    entity: &EntityIdentity,
    selection_id: Option<&str>,
    open_count: i64,
    family: MessageFamily,
) -> Option<String> {
    for tier in message_tiers(doc, entity, selection_id) {
        let Some(sequence) = family.array(tier) else {
            continue;
        };
        if sequence.is_empty() {
            continue;
        }
        return pick(sequence, open_count, loop_messages(doc, tier)).cloned();
    }
    None
}

/// Resolve message, title, and subtitle together: the first tier where
/// any of the three picks non-nil supplies all three, so a selection's
/// title never mixes with a global message.
pub fn resolve_message_triple(
    doc: &ConfigDocument,
    entity: &EntityIdentity,
    selection_id: Option<&str>,
    open_count: i64,
) -> ResolvedMessages {
    for tier in message_tiers(doc, entity, selection_id) {
        let looped = loop_messages(doc, tier);
        let pick_family = |family: MessageFamily| {
            family
                .array(tier)
                .and_then(|sequence| pick(sequence, open_count, looped))
                .cloned()
        };

        let resolved = ResolvedMessages {
            message: pick_family(MessageFamily::Messages),
            title: pick_family(MessageFamily::TitleMessages),
            subtitle: pick_family(MessageFamily::SubtitleMessages),
        };
        if resolved.message.is_some() || resolved.title.is_some() || resolved.subtitle.is_some() {
            return resolved;
        }
    }

    ResolvedMessages::default()
}

/// Resolve the icon override fields, if any tier yields a usable
/// choice. A picked but unrecognized choice (unknown type, blank name)
/// skips its tier exactly as if `iconChoices` were absent there.
pub fn resolve_icon_override(
    doc: &ConfigDocument,
    entity: &EntityIdentity,
    selection_id: Option<&str>,
    open_count: i64,
) -> Option<FieldConfig> {
    for tier in field_tiers(doc, entity, selection_id) {
        let Some(choices) = tier.icon_choices.as_deref() else {
            continue;
        };
        if choices.is_empty() {
            continue;
        }

        let choice = pick(choices, open_count, loop_icons(doc, tier))?;
        match choice.override_fields() {
            Some(fields) => return Some(fields),
            None => continue,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> ConfigDocument {
        ConfigDocument::from_value(&value)
    }

    fn app(bundle_id: &str) -> EntityIdentity {
        EntityIdentity::Application {
            bundle_id: Some(bundle_id.to_string()),
            display_name: None,
            token: None,
        }
    }

    fn domain(domain: &str) -> EntityIdentity {
        EntityIdentity::WebDomain {
            domain: Some(domain.to_string()),
            token: None,
        }
    }

    #[test]
    fn test_selection_beats_app_beats_root() {
        let doc = doc(json!({
            "messages": ["C"],
            "perApp": {"com.x": {"messages": ["B"]}},
            "perSelectionId": {"S": {"messages": ["A"]}},
        }));
        let entity = app("com.x");

        let message = |selection: Option<&str>, d: &ConfigDocument| {
            resolve_family(d, &entity, selection, 1, MessageFamily::Messages)
        };

        assert_eq!(message(Some("S"), &doc), Some("A".to_string()));
        assert_eq!(message(None, &doc), Some("B".to_string()));

        let without_app = ConfigDocument::from_value(&json!({
            "messages": ["C"],
            "perSelectionId": {"S": {"messages": ["A"]}},
        }));
        assert_eq!(message(None, &without_app), Some("C".to_string()));

        let empty = ConfigDocument::default();
        assert_eq!(message(Some("S"), &empty), None);
    }

    #[test]
    fn test_empty_array_does_not_win_the_tier() {
        let doc = doc(json!({
            "messages": ["root"],
            "perApp": {"com.x": {"messages": []}},
        }));
        assert_eq!(
            resolve_family(&doc, &app("com.x"), None, 1, MessageFamily::Messages),
            Some("root".to_string())
        );
    }

    #[test]
    fn test_families_resolve_independently() {
        let doc = doc(json!({
            "subtitleMessages": ["root subtitle"],
            "perApp": {"com.x": {"titleMessages": ["app title"]}},
        }));
        let entity = app("com.x");

        assert_eq!(
            resolve_family(&doc, &entity, None, 1, MessageFamily::TitleMessages),
            Some("app title".to_string())
        );
        // The app tier has no subtitles, so the root's still apply.
        assert_eq!(
            resolve_family(&doc, &entity, None, 1, MessageFamily::SubtitleMessages),
            Some("root subtitle".to_string())
        );
        assert_eq!(
            resolve_family(&doc, &entity, None, 1, MessageFamily::Messages),
            None
        );
    }

    #[test]
    fn test_triple_short_circuits_to_one_tier() {
        let doc = doc(json!({
            "messages": ["root message"],
            "perApp": {"com.x": {"titleMessages": ["app title"]}},
        }));

        let triple = resolve_message_triple(&doc, &app("com.x"), None, 1);
        // The app tier yields a title, so the root message must not mix in.
        assert_eq!(
            triple,
            ResolvedMessages {
                message: None,
                title: Some("app title".to_string()),
                subtitle: None,
            }
        );
    }

    #[test]
    fn test_triple_empty_everywhere() {
        let triple = resolve_message_triple(&ConfigDocument::default(), &app("com.x"), None, 3);
        assert_eq!(triple, ResolvedMessages::default());
    }

    #[test]
    fn test_loop_flag_resolves_tier_then_root_then_default() {
        // Tier flag wins.
        let doc_tier = doc(json!({
            "loopMessages": true,
            "perApp": {"com.x": {"messages": ["a", "b"], "loopMessages": false}},
        }));
        assert_eq!(
            resolve_family(&doc_tier, &app("com.x"), None, 5, MessageFamily::Messages),
            Some("b".to_string())
        );

        // Tier silent: root flag applies.
        let doc_root = doc(json!({
            "loopMessages": false,
            "perApp": {"com.x": {"messages": ["a", "b"]}},
        }));
        assert_eq!(
            resolve_family(&doc_root, &app("com.x"), None, 5, MessageFamily::Messages),
            Some("b".to_string())
        );

        // Nobody sets it: looping is the default.
        let doc_default = doc(json!({"messages": ["a", "b"]}));
        assert_eq!(
            resolve_family(&doc_default, &app("com.x"), None, 3, MessageFamily::Messages),
            Some("a".to_string())
        );
    }

    #[test]
    fn test_domain_messages_skip_selection_tier() {
        let doc = doc(json!({
            "messages": ["root"],
            "perDomain": {"example.com": {"messages": ["domain"]}},
            "perSelectionId": {"S": {"messages": ["selection"]}},
        }));
        let entity = domain("Example.COM");

        // Text path: two tiers only, selection ignored even when passed.
        assert_eq!(
            resolve_family(&doc, &entity, Some("S"), 1, MessageFamily::Messages),
            Some("domain".to_string())
        );

        let triple = resolve_message_triple(&doc, &entity, Some("S"), 1);
        assert_eq!(triple.message, Some("domain".to_string()));
    }

    #[test]
    fn test_domain_icons_still_use_selection_tier() {
        let doc = doc(json!({
            "perSelectionId": {
                "S": {"iconChoices": [{"type": "SFSymbol", "name": "lock"}]},
            },
        }));
        let fields = resolve_icon_override(&doc, &domain("example.com"), Some("S"), 1)
            .expect("selection tier icon");
        assert_eq!(fields.get("iconSystemName"), Some(&json!("lock")));
    }

    #[test]
    fn test_icon_rotation_uses_loop_icons_flag() {
        let doc = doc(json!({
            "iconChoices": [
                {"type": "SFSymbol", "name": "one"},
                {"type": "SFSymbol", "name": "two"},
            ],
            "loopIcons": false,
        }));
        let entity = app("com.x");

        let fields = resolve_icon_override(&doc, &entity, None, 9).unwrap();
        assert_eq!(fields.get("iconSystemName"), Some(&json!("two")));
    }

    #[test]
    fn test_unrecognized_pick_skips_the_tier() {
        let doc = doc(json!({
            "iconChoices": [{"type": "AssetName", "name": "root-icon"}],
            "perApp": {
                "com.x": {"iconChoices": [{"type": "Bogus", "name": "x"}]},
            },
        }));

        // The app tier picks its only (bogus) choice and falls through.
        let fields = resolve_icon_override(&doc, &app("com.x"), None, 1).unwrap();
        assert_eq!(fields.get("iconAssetName"), Some(&json!("root-icon")));
    }

    #[test]
    fn test_icon_override_absent_everywhere() {
        assert_eq!(
            resolve_icon_override(&ConfigDocument::default(), &app("com.x"), None, 1),
            None
        );
    }

    #[test]
    fn test_resolve_scope_prefers_most_specific() {
        let doc = doc(json!({
            "perApp": {"com.x": {"messages": ["B"]}},
            "perSelectionId": {"S": {"messages": ["A"]}},
        }));
        let entity = app("com.x");

        let scope = resolve_scope(&doc, &entity, Some("S"));
        assert_eq!(scope.messages, Some(vec!["A".to_string()]));

        let scope = resolve_scope(&doc, &entity, None);
        assert_eq!(scope.messages, Some(vec!["B".to_string()]));

        let scope = resolve_scope(&doc, &app("com.other"), None);
        assert_eq!(scope.messages, None);
    }
}
