//! Common types used throughout Recast.

/// Identifier of a broadcast event within a channel schedule.
pub type EventId = i64;

/// Channel number as presented to viewers.
pub type ChannelNumber = u32;
