//! Interest matching.
//!
//! A user's free-text interests are split on commas into interest tags. An
//! event is relevant when at least one of its tags is among them. Matching is
//! a stable filter: kept events stay in input order and nothing is scored.

use std::collections::HashSet;

use crate::event::{Event, normalize_tags};

/// Filters events against a parsed set of interest tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestMatcher {
    tags: HashSet<String>,
    unfiltered: bool,
}

impl InterestMatcher {
    /// Parses interest text such as `"Music, art"`.
    pub fn new(interest_text: &str) -> Self {
        Self {
            tags: normalize_tags([interest_text]).into_iter().collect(),
            unfiltered: interest_text.trim().is_empty(),
        }
    }

    /// Returns the parsed interest tags.
    pub fn tags(&self) -> &HashSet<String> {
        &self.tags
    }

    /// Returns true when the interest text is blank and every event passes.
    ///
    /// Text made only of separators is not blank: it has no tags, so nothing
    /// matches it.
    pub fn is_unfiltered(&self) -> bool {
        self.unfiltered
    }

    /// Returns true if the event shares at least one tag with the interests.
    pub fn matches(&self, event: &Event) -> bool {
        if self.is_unfiltered() {
            return true;
        }
        normalize_tags(&event.tags)
            .iter()
            .any(|tag| self.tags.contains(tag))
    }

    /// Keeps the matching events, in input order.
    pub fn filter<I>(&self, events: I) -> Vec<Event>
    where
        I: IntoIterator<Item = Event>,
    {
        events.into_iter().filter(|e| self.matches(e)).collect()
    }
}

/// Returns the events relevant to `interest_text`.
pub fn match_events<I>(interest_text: &str, events: I) -> Vec<Event>
where
    I: IntoIterator<Item = Event>,
{
    InterestMatcher::new(interest_text).filter(events)
}
