//! The timer entity and the descriptor grammar its parser accepts.
//!
//! A timer travels over the wire as a colon-delimited descriptor:
//!
//! ```text
//! flags:channel:dayspec:start:stop:priority:lifetime:file:aux
//! ```
//!
//! `dayspec` is empty, a 7-character weekday mask (`MTWTF--`), a bare
//! `YYYY-MM-DD` date, an `@`-prefixed date, or `MASK@DATE`. `file` and
//! `aux` never contain a colon (the REST layer rewrites them), so a
//! bounded split recovers the fields unambiguously.

use chrono::{Datelike, Days, Local, NaiveDate, NaiveTime, TimeZone};
use recast_common::{Error, EventId, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::channels::ChannelLookup;

/// A scheduled recording instruction.
///
/// Schedule fields come from the descriptor; `recording` and `pending`
/// are live state owned by recording control, and `event_id` is the
/// schedule association recomputed on every create/update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timer {
    pub flags: u32,
    pub channel_id: String,
    /// Repeat mask, Monday = 64 down to Sunday = 1; 0 for one-shot timers.
    pub weekdays: u8,
    /// First (or only) day as local-midnight epoch seconds; 0 when unset.
    pub day: i64,
    /// Start time as HHMM.
    pub start: i32,
    /// Stop time as HHMM; earlier than `start` means past midnight.
    pub stop: i32,
    pub priority: i32,
    pub lifetime: i32,
    pub file: String,
    pub aux: String,
    pub event_id: Option<EventId>,
    pub recording: bool,
    pub pending: bool,
}

impl Timer {
    /// Parse a descriptor into a fresh entity.
    pub fn parse(descriptor: &str) -> Result<Timer> {
        let fields: Vec<&str> = descriptor.splitn(9, ':').collect();
        if fields.len() != 9 {
            return Err(Error::Encoding(format!(
                "descriptor has {} fields, expected 9",
                fields.len()
            )));
        }
        if fields[1].is_empty() {
            return Err(Error::Encoding("descriptor channel is empty".to_string()));
        }
        let (weekdays, day) = parse_day_spec(fields[2])?;
        Ok(Timer {
            flags: parse_num(fields[0], "flags")?,
            channel_id: fields[1].to_string(),
            weekdays,
            day,
            start: parse_num(fields[3], "start")?,
            stop: parse_num(fields[4], "stop")?,
            priority: parse_num(fields[5], "priority")?,
            lifetime: parse_num(fields[6], "lifetime")?,
            file: fields[7].to_string(),
            aux: fields[8].to_string(),
            ..Timer::default()
        })
    }

    /// Re-parse a descriptor into this entity, keeping live state.
    pub fn apply_descriptor(&mut self, descriptor: &str) -> Result<()> {
        let parsed = Timer::parse(descriptor)?;
        *self = Timer {
            recording: self.recording,
            pending: self.pending,
            ..parsed
        };
        Ok(())
    }

    /// Structural identity used for duplicate detection on create.
    pub fn is_equivalent(&self, other: &Timer) -> bool {
        self.channel_id == other.channel_id
            && self.weekdays == other.weekdays
            && self.day == other.day
            && self.start == other.start
            && self.stop == other.stop
    }

    pub fn is_active(&self) -> bool {
        self.flags & 0x01 == 0x01
    }

    /// Epoch window of the next firing, if one can be computed.
    ///
    /// One-shot timers fire on `day`; repeating timers on the next
    /// weekday matching the mask, counted from today.
    pub fn next_occurrence(&self) -> Option<(i64, i64)> {
        let day_epoch = if self.day != 0 {
            self.day
        } else if self.weekdays != 0 {
            next_matching_day(self.weekdays)?
        } else {
            return None;
        };
        let start = day_epoch + hhmm_to_secs(self.start);
        let mut stop = day_epoch + hhmm_to_secs(self.stop);
        if stop <= start {
            stop += 24 * 3600;
        }
        Some((start, stop))
    }

    /// Recompute the schedule-event association for the next firing.
    pub fn set_event_from_schedule(&mut self, channels: &dyn ChannelLookup) {
        self.event_id = self.next_occurrence().and_then(|(start, stop)| {
            channels
                .event_covering(&self.channel_id, start, stop)
                .map(|e| e.id)
        });
    }
}

/// Local-midnight epoch seconds for a calendar date.
pub fn local_midnight(date: NaiveDate) -> Option<i64> {
    Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|dt| dt.timestamp())
}

fn hhmm_to_secs(v: i32) -> i64 {
    ((v / 100) * 3600 + (v % 100) * 60) as i64
}

fn next_matching_day(mask: u8) -> Option<i64> {
    let today = Local::now().date_naive();
    (0..7u64).find_map(|offset| {
        let date = today.checked_add_days(Days::new(offset))?;
        let bit = 64u8 >> date.weekday().num_days_from_monday();
        if mask & bit != 0 {
            local_midnight(date)
        } else {
            None
        }
    })
}

fn parse_num<T: FromStr>(s: &str, field: &str) -> Result<T> {
    s.parse()
        .map_err(|_| Error::Encoding(format!("descriptor field {field} is not numeric: {s:?}")))
}

fn parse_day_spec(s: &str) -> Result<(u8, i64)> {
    if s.is_empty() {
        return Ok((0, 0));
    }
    let (mask_part, date_part) = match s.split_once('@') {
        Some((mask, date)) => (mask, date),
        None if s.starts_with(|c: char| c.is_ascii_digit()) => ("", s),
        None => (s, ""),
    };
    let weekdays = if mask_part.is_empty() {
        0
    } else {
        parse_weekday_mask(mask_part)?
    };
    let day = if date_part.is_empty() {
        0
    } else {
        parse_date(date_part)?
    };
    Ok((weekdays, day))
}

fn parse_weekday_mask(s: &str) -> Result<u8> {
    if s.chars().count() != 7 {
        return Err(Error::Encoding(format!("weekday mask {s:?} is not 7 characters")));
    }
    let mut mask = 0u8;
    for (i, (c, letter)) in s.chars().zip("MTWTFSS".chars()).enumerate() {
        if c == letter {
            mask |= 64 >> i;
        } else if c != '-' {
            return Err(Error::Encoding(format!("weekday mask {s:?} has {c:?} at position {i}")));
        }
    }
    Ok(mask)
}

fn parse_date(s: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| Error::Encoding(format!("descriptor day {s:?} is not a calendar date")))?;
    local_midnight(date).ok_or_else(|| Error::Encoding(format!("day {s:?} has no local midnight")))
}
