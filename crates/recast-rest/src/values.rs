//! Conversion and validation of raw request fields into timer values.
//!
//! Every logical field has a converter and a separate validator, so the
//! request handler can check validity before deciding whether to use
//! the supplied value or a fallback — creates reject invalid fields,
//! updates substitute the existing timer's values.

use chrono::{Local, TimeZone};
use lazy_static::lazy_static;
use recast_common::EventId;
use recast_store::{Channel, ChannelLookup, Event};
use regex::Regex;

lazy_static! {
    static ref DAY_PATTERN: Regex = Regex::new(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}$").unwrap();
}

/// Weekday initials in mask order, Monday first.
const WEEKDAY_LETTERS: [char; 7] = ['M', 'T', 'W', 'T', 'F', 'S', 'S'];

/// The all-days-off mask of a one-shot timer.
pub const WEEKDAY_SENTINEL: &str = "-------";

pub fn convert_flags(v: &str) -> u32 {
    v.trim().parse().unwrap_or(0)
}

/// Timer flags are not composable; only the listed values are accepted.
pub fn is_flags_valid(v: u32) -> bool {
    matches!(v, 0x0000 | 0x0001 | 0x0002 | 0x0004 | 0x0008 | 0xFFFF)
}

/// Free-text fields must not carry the descriptor delimiter.
pub fn convert_file(v: &str) -> String {
    v.replace(':', "|")
}

pub fn convert_aux(v: &str) -> String {
    convert_file(v)
}

pub fn is_file_valid(v: &str) -> bool {
    !v.is_empty() && v.len() <= 40
}

fn convert_int(v: &str) -> i32 {
    v.trim().parse().unwrap_or(-1)
}

pub fn convert_lifetime(v: &str) -> i32 {
    convert_int(v)
}

pub fn convert_priority(v: &str) -> i32 {
    convert_int(v)
}

pub fn convert_start(v: &str) -> i32 {
    convert_int(v)
}

pub fn convert_stop(v: &str) -> i32 {
    convert_int(v)
}

pub fn is_lifetime_valid(v: i32) -> bool {
    (0..=99).contains(&v)
}

/// Priority uses the same range as lifetime.
pub fn is_priority_valid(v: i32) -> bool {
    is_lifetime_valid(v)
}

/// HHMM encoding, e.g. 2230 for half past ten at night.
pub fn is_stop_valid(v: i32) -> bool {
    let minutes = v % 100;
    let hours = (v - minutes) / 100;
    (0..60).contains(&minutes) && (0..24).contains(&hours)
}

/// Start uses the same encoding as stop.
pub fn is_start_valid(v: i32) -> bool {
    is_stop_valid(v)
}

pub fn is_weekdays_valid(v: &str) -> bool {
    v.chars().count() == 7
        && v.chars()
            .zip(WEEKDAY_LETTERS)
            .all(|(c, letter)| c == '-' || c == letter)
}

/// Repeat mask from string form, Monday = 64 down to Sunday = 1.
pub fn weekdays_from_str(v: &str) -> u8 {
    let mut mask = 0;
    for (i, (c, letter)) in v.chars().zip(WEEKDAY_LETTERS).enumerate() {
        if c == letter {
            mask |= 64 >> i;
        }
    }
    mask
}

/// String form of a repeat mask; inverse of [`weekdays_from_str`].
pub fn weekdays_to_str(mask: u8) -> String {
    WEEKDAY_LETTERS
        .iter()
        .enumerate()
        .map(|(i, &letter)| if mask & (64 >> i) != 0 { letter } else { '-' })
        .collect()
}

/// Pattern check only; month and day are not range-checked.
pub fn is_day_valid(v: &str) -> bool {
    DAY_PATTERN.is_match(v)
}

/// Normalize a `YYYY-M-D` day to zero-padded `YYYY-MM-DD`.
///
/// Returns the literal `"wrong format"` for input that does not match
/// the pattern; callers must check [`is_day_valid`] before trusting the
/// result.
pub fn convert_day(v: &str) -> String {
    if !is_day_valid(v) {
        return "wrong format".to_string();
    }
    let mut parts = v.split('-');
    let year = parts.next().unwrap_or_default();
    let month = parts.next().unwrap_or_default();
    let day = parts.next().unwrap_or_default();
    format!("{year}-{month:0>2}-{day:0>2}")
}

/// Local calendar date of an epoch second; 0 maps to the empty string.
pub fn day_from_epoch(v: i64) -> String {
    if v == 0 {
        return String::new();
    }
    Local
        .timestamp_opt(v, 0)
        .earliest()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Resolve a channel by id string or viewer-facing number.
pub fn convert_channel(v: &str, channels: &dyn ChannelLookup) -> Option<Channel> {
    channels.channel(v)
}

/// Parse a timer id into a store index; the caller resolves the entity.
pub fn convert_timer(v: &str) -> Option<usize> {
    v.trim().parse().ok()
}

/// Resolve a schedule event by id within a channel.
pub fn convert_event(
    event_id: &str,
    channel: Option<&Channel>,
    channels: &dyn ChannelLookup,
) -> Option<Event> {
    let channel = channel?;
    let id: EventId = event_id.trim().parse().ok()?;
    if id <= -1 {
        return None;
    }
    channels.event(&channel.id, id)
}
