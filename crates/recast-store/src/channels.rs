//! Channel lineup and schedule lookup.

use recast_common::{ChannelNumber, EventId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A receivable channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Channel {
    /// Stable transponder-derived identifier, e.g. `S19.2E-1-1019-10301`.
    pub id: String,
    pub number: ChannelNumber,
    pub name: String,
}

/// A broadcast event in a channel schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// Epoch seconds.
    pub start: i64,
    /// Seconds.
    pub duration: i64,
}

/// Read-only resolution of channels and their schedules.
pub trait ChannelLookup: Send + Sync {
    /// Resolve by channel id string or viewer-facing number.
    fn channel(&self, key: &str) -> Option<Channel>;

    /// Event with the given id in the channel's schedule.
    fn event(&self, channel_id: &str, event_id: EventId) -> Option<Event>;

    /// First schedule event overlapping the given epoch window.
    fn event_covering(&self, channel_id: &str, start: i64, stop: i64) -> Option<Event>;
}

/// In-memory implementation of [`ChannelLookup`].
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: Vec<Channel>,
    schedules: HashMap<String, Vec<Event>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(channels: Vec<Channel>) -> Self {
        Self {
            channels,
            schedules: HashMap::new(),
        }
    }

    pub fn add_channel(&mut self, channel: Channel) {
        self.channels.push(channel);
    }

    pub fn add_event(&mut self, channel_id: &str, event: Event) {
        self.schedules
            .entry(channel_id.to_string())
            .or_default()
            .push(event);
    }
}

impl ChannelLookup for ChannelRegistry {
    fn channel(&self, key: &str) -> Option<Channel> {
        if key.is_empty() {
            return None;
        }
        if let Some(c) = self.channels.iter().find(|c| c.id == key) {
            return Some(c.clone());
        }
        key.parse::<ChannelNumber>()
            .ok()
            .and_then(|n| self.channels.iter().find(|c| c.number == n).cloned())
    }

    fn event(&self, channel_id: &str, event_id: EventId) -> Option<Event> {
        self.schedules
            .get(channel_id)?
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
    }

    fn event_covering(&self, channel_id: &str, start: i64, stop: i64) -> Option<Event> {
        self.schedules
            .get(channel_id)?
            .iter()
            .find(|e| e.start < stop && start < e.start + e.duration)
            .cloned()
    }
}
