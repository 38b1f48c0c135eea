//! Core types: canonical events, date normalization, interest matching,
//! profiles, formatting.

pub mod event;
pub mod format;
pub mod interest;
pub mod profile;
pub mod time;
pub mod tracing;

pub use event::{Event, EventKey, UNTITLED, normalize_tags};
pub use format::{
    FormatOptions, JsonOutput, NO_EVENTS_TEXT, OutputFormat, RECOMMENDATION_HEADING, ellipsis,
    format_json, format_text,
};
pub use interest::{InterestMatcher, match_events};
pub use profile::{
    ProfileError, ProfileField, RegistrationFlow, RegistrationState, UserInterestProfile,
};
pub use time::{DISPLAY_FORMAT, epoch_to_display, epoch_to_display_in, iso_to_display};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
