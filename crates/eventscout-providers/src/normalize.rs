//! Field cleanup shared by the adapters' `parse_item` functions.

use std::sync::LazyLock;

use eventscout_core::Event;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid HTML tag regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Entities that show up in provider descriptions.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&laquo;", "«"),
    ("&raquo;", "»"),
    ("&mdash;", "—"),
    ("&ndash;", "–"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    // last, so "&amp;lt;" stays "&lt;"
    ("&amp;", "&"),
];

/// Strips HTML markup and collapses whitespace.
pub fn clean_text(raw: &str) -> String {
    let mut text = HTML_TAG_REGEX.replace_all(raw, " ").into_owned();
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }
    WHITESPACE_REGEX.replace_all(&text, " ").trim().to_string()
}

/// Returns the first candidate that is not blank.
pub fn first_non_blank<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

/// Converts a provider id (number or string) into the canonical string form.
pub fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Runs `parse` over every item, logging the ones it drops.
pub fn parse_items(
    source: &str,
    items: &[Value],
    parse: fn(&Value) -> Option<Event>,
) -> Vec<Event> {
    let mut events = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match parse(item) {
            Some(event) => events.push(event),
            None => warn!(
                source,
                index, "dropping listing that is not an object or has no id"
            ),
        }
    }
    events
}
