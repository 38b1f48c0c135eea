//! Plain-text and JSON rendering of event lists.
//!
//! Used by the command-line client. Any other front end is free to render
//! [`Event`] lists its own way.

use std::borrow::Cow;

use serde::Serialize;

use crate::event::Event;

/// Heading printed above recommendations.
pub const RECOMMENDATION_HEADING: &str = "Here are some recommended events:";

/// Text shown when a list is empty.
pub const NO_EVENTS_TEXT: &str = "No events found.";

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Numbered plain-text list.
    #[default]
    Text,
    /// JSON document.
    Json,
}

/// Options for rendering.
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Maximum number of events to render.
    pub limit: Option<usize>,
    /// Maximum summary length (truncated with ellipsis).
    pub max_summary_length: Option<usize>,
}

impl FormatOptions {
    /// Builder method to set the limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builder method to set the maximum summary length.
    pub fn with_max_summary_length(mut self, max: usize) -> Self {
        self.max_summary_length = Some(max);
        self
    }

    fn visible<'a>(&self, events: &'a [Event]) -> &'a [Event] {
        match self.limit {
            Some(limit) if limit < events.len() => &events[..limit],
            _ => events,
        }
    }
}

/// JSON document produced by [`format_json`].
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// Number of events before the limit was applied.
    pub total: usize,
    pub events: &'a [Event],
}

/// Renders a numbered list under `heading`.
///
/// An empty list renders as [`NO_EVENTS_TEXT`].
pub fn format_text(events: &[Event], heading: &str, options: &FormatOptions) -> String {
    let events = options.visible(events);
    if events.is_empty() {
        return NO_EVENTS_TEXT.to_string();
    }

    let mut out = String::from(heading);
    for (idx, event) in events.iter().enumerate() {
        out.push_str(&format!("\n\n{}) {}", idx + 1, event.title));
        if event.has_date() {
            out.push_str(&format!("\nDate: {}", event.occurs_at));
        }
        let summary = match options.max_summary_length {
            Some(max) => ellipsis(&event.summary, max),
            None => Cow::Borrowed(event.summary.as_str()),
        };
        if summary != event.title {
            out.push_str(&format!("\nDescription: {}", summary));
        }
        if !event.link.is_empty() {
            out.push_str(&format!("\nLink: {}", event.link));
        }
    }
    out
}

/// Renders events as pretty-printed JSON.
pub fn format_json(events: &[Event], options: &FormatOptions) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput {
        total: events.len(),
        events: options.visible(events),
    })
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }
    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated.trim_end()))
}
