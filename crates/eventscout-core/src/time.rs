//! Date normalization for provider timestamps.
//!
//! Providers encode start times differently: KudaGo sends Unix epoch seconds,
//! TimePad and Eventbrite send ISO-8601 strings with an offset. Both are
//! turned into one display string, `YYYY-MM-DD HH:MM`. Neither function fails:
//! unusable input yields an empty string.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

/// `strftime` pattern of the canonical display string.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Number of leading characters kept from an ISO-8601 string.
const ISO_DISPLAY_LEN: usize = 16;

/// Formats Unix epoch seconds as local time.
///
/// `None` and `0` yield an empty string, as do timestamps chrono cannot
/// represent.
pub fn epoch_to_display(timestamp: Option<i64>) -> String {
    epoch_to_display_in(timestamp, &Local)
}

/// Formats Unix epoch seconds in the given timezone.
pub fn epoch_to_display_in<Tz>(timestamp: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(seconds) = timestamp.filter(|ts| *ts != 0) else {
        return String::new();
    };

    match DateTime::from_timestamp(seconds, 0) {
        Some(utc) => utc.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Truncates an ISO-8601 string to its first 16 characters.
///
/// The `T` separator becomes a space; the timezone offset is dropped, not
/// converted. Shorter strings are returned as-is apart from the separator.
pub fn iso_to_display(iso: Option<&str>) -> String {
    match iso {
        None | Some("") => String::new(),
        Some(iso) => iso
            .chars()
            .take(ISO_DISPLAY_LEN)
            .map(|c| if c == 'T' { ' ' } else { c })
            .collect(),
    }
}
