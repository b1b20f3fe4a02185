//! `{name}` placeholder substitution for shield texts.

use crate::resolve::placeholders::PlaceholderMap;

/// Substitute every `{name}` token whose name is present in the map.
///
/// A key mapped to `None` is intentionally blank and renders as the
/// empty string; the literal token is never left behind for a present
/// key. Names absent from the map stay in the text untouched, so the
/// caller can tell an unknown placeholder from a blank one.
pub fn render_template(text: &str, placeholders: &PlaceholderMap) -> String {
    let mut rendered = text.to_string();
    for (name, value) in placeholders {
        let token = format!("{{{name}}}");
        if rendered.contains(&token) {
            rendered = rendered.replace(&token, value.as_deref().unwrap_or(""));
        }
    }
    rendered
}
