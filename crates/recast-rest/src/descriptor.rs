//! Canonical descriptor encoding of validated timer values.

use crate::values::WEEKDAY_SENTINEL;

/// Validated-or-defaulted values for one create/update request.
///
/// Built by the request handler after validation and fallback have been
/// applied; only ever lives for the duration of the request.
#[derive(Debug, Clone)]
pub struct TimerFields {
    pub flags: u32,
    pub channel_id: String,
    /// 7-character weekday mask string form.
    pub weekdays: String,
    /// Zero-padded `YYYY-MM-DD`, or empty.
    pub day: String,
    pub start: i32,
    pub stop: i32,
    pub priority: i32,
    pub lifetime: i32,
    pub file: String,
    pub aux: String,
}

/// Build the colon-delimited descriptor the timer store parses.
///
/// The weekday segment carries the mask unless it is the all-`-`
/// sentinel, in which case it is empty; the `@day` segment is appended
/// only when the mask is the sentinel and a day is present. A day
/// supplied alongside a non-sentinel mask is dropped.
pub fn build_descriptor(fields: &TimerFields) -> String {
    let day_spec = if fields.weekdays != WEEKDAY_SENTINEL {
        fields.weekdays.clone()
    } else if !fields.day.is_empty() {
        format!("@{}", fields.day)
    } else {
        String::new()
    };
    format!(
        "{}:{}:{}:{}:{}:{}:{}:{}:{}",
        fields.flags,
        fields.channel_id,
        day_spec,
        fields.start,
        fields.stop,
        fields.priority,
        fields.lifetime,
        fields.file,
        fields.aux
    )
}
