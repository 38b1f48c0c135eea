//! Canonical event record.
//!
//! Every provider adapter maps its listings into [`Event`], the single
//! source-agnostic shape that is stored, matched, and rendered. An event is
//! identified by its [`EventKey`], the pair of provider name and
//! provider-native id; the storage surrogate id is not part of it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder title used when a provider omits one.
pub const UNTITLED: &str = "Untitled";

/// Identity of an event: `(source, external_id)`.
///
/// Two events from different sources are always distinct, even when every
/// other field is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    /// Provider the event came from.
    pub source: String,
    /// Provider-native identifier, unique only within `source`.
    pub external_id: String,
}

impl EventKey {
    /// Creates a new key.
    pub fn new(source: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            external_id: external_id.into(),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.external_id)
    }
}

/// A normalized event from any provider.
///
/// Built once by an adapter and never changed afterwards; the builder
/// methods consume `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Provider identifier (e.g. "kudago").
    pub source: String,
    /// Provider-native identifier.
    pub external_id: String,
    /// Display title, [`UNTITLED`] when the provider has none.
    pub title: String,
    /// `YYYY-MM-DD HH:MM`, or empty when no usable timestamp was supplied.
    pub occurs_at: String,
    /// Provider event page, may be empty.
    pub link: String,
    /// Short description, the title when the provider has no description.
    pub summary: String,
    /// Lowercase keyword tokens used for interest matching.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Event {
    /// Creates an event with the required identity and title.
    ///
    /// A blank title is replaced by [`UNTITLED`]; the summary starts out equal
    /// to the title.
    pub fn new(
        source: impl Into<String>,
        external_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            title.trim().to_string()
        };

        Self {
            source: source.into(),
            external_id: external_id.into(),
            summary: title.clone(),
            title,
            occurs_at: String::new(),
            link: String::new(),
            tags: Vec::new(),
        }
    }

    /// Builder method to set the display date.
    pub fn with_occurs_at(mut self, occurs_at: impl Into<String>) -> Self {
        self.occurs_at = occurs_at.into();
        self
    }

    /// Builder method to set the link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Builder method to set the summary. Blank values keep the title.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        let summary = summary.into();
        if !summary.trim().is_empty() {
            self.summary = summary.trim().to_string();
        }
        self
    }

    /// Builder method to set tags, normalized with [`normalize_tags`].
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    /// Builder method to set tags from a comma-separated field.
    pub fn with_tag_field(self, field: &str) -> Self {
        self.with_tags([field])
    }

    /// Returns the identity of this event.
    pub fn key(&self) -> EventKey {
        EventKey::new(&self.source, &self.external_id)
    }

    /// Returns true if the provider supplied a usable date.
    pub fn has_date(&self) -> bool {
        !self.occurs_at.is_empty()
    }
}

/// Normalizes raw tag values into interest tags.
///
/// Each value is split on commas; tokens are trimmed and lowercased, empty
/// tokens are dropped and duplicates removed keeping first-seen order.
pub fn normalize_tags<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for value in values {
        for token in value.as_ref().split(',') {
            let token = token.trim().to_lowercase();
            if !token.is_empty() && !tags.contains(&token) {
                tags.push(token);
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_defaults() {
        let event = Event::new("kudago", "42", "Expo");
        assert_eq!(event.title, "Expo");
        assert_eq!(event.summary, "Expo");
        assert!(event.occurs_at.is_empty());
        assert!(event.link.is_empty());
        assert!(event.tags.is_empty());
        assert!(!event.has_date());
    }

    #[test]
    fn blank_title_uses_placeholder() {
        let event = Event::new("timepad", "1", "   ");
        assert_eq!(event.title, UNTITLED);
        assert_eq!(event.summary, UNTITLED);
    }

    #[test]
    fn blank_summary_keeps_title() {
        let event = Event::new("timepad", "1", "Lecture").with_summary("  ");
        assert_eq!(event.summary, "Lecture");

        let event = Event::new("timepad", "1", "Lecture").with_summary(" About cats ");
        assert_eq!(event.summary, "About cats");
    }

    #[test]
    fn tags_are_normalized() {
        let event = Event::new("kudago", "1", "Expo").with_tags(["Art, Culture", "art", " ", "MUSIC"]);
        assert_eq!(event.tags, vec!["art", "culture", "music"]);
    }

    #[test]
    fn tag_field_parses_comma_list() {
        let event = Event::new("demo", "1", "Fest").with_tag_field("music,festival, concert");
        assert_eq!(event.tags, vec!["music", "festival", "concert"]);
    }

    #[test]
    fn key_distinguishes_sources() {
        let a = Event::new("kudago", "1", "Expo");
        let b = Event::new("timepad", "1", "Expo");
        assert_ne!(a.key(), b.key());
        assert_ne!(a, b);
        assert_eq!(a.key().to_string(), "kudago:1");
    }

    #[test]
    fn serde_keeps_all_fields() {
        let event = Event::new("eventbrite", "99", "Meetup")
            .with_occurs_at("2025-03-12 19:00")
            .with_link("https://example.com/e/99")
            .with_tags(["tech"]);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["external_id"], "99");
        assert_eq!(json["occurs_at"], "2025-03-12 19:00");
        assert_eq!(json["tags"][0], "tech");
    }
}
