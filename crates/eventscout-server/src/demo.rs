//! Demo events used to populate an empty store.

use eventscout_core::Event;

/// Source name stored on demo events.
pub const DEMO_SOURCE: &str = "demo";

/// Returns the demo events.
pub fn demo_events() -> Vec<Event> {
    [
        (
            "city-tour",
            "City Tour",
            "Explore the main city attractions.",
            "tour,city,sightseeing",
            "2025-03-10 12:00",
        ),
        (
            "language-exchange",
            "Language Exchange",
            "Practice languages with locals.",
            "language,exchange,communication",
            "2025-03-11 12:00",
        ),
        (
            "music-festival",
            "Music Festival",
            "Enjoy live music performances.",
            "music,festival,concert",
            "2025-03-12 12:00",
        ),
        (
            "russian-culture-101",
            "Russian Culture 101",
            "Intro session on local traditions.",
            "culture,traditions,lecture",
            "2025-03-15 12:00",
        ),
    ]
    .into_iter()
    .map(|(id, title, summary, tags, date)| {
        Event::new(DEMO_SOURCE, id, title)
            .with_summary(summary)
            .with_tag_field(tags)
            .with_occurs_at(date)
    })
    .collect()
}
