//! Timer, channel, and recording-control storage for Recast.
//!
//! The REST layer consumes everything here through narrow interfaces:
//! [`TimerStore`] owns the persistent timer entities, [`ChannelLookup`]
//! resolves channels and their schedules, and [`RecordingControl`]
//! receives stop/reprocess signals. Each has an in-memory
//! implementation used by the server binary and the test suite.

pub mod channels;
pub mod recording;
pub mod store;
pub mod timer;

pub use channels::{Channel, ChannelLookup, ChannelRegistry, Event};
pub use recording::{RecordingControl, RecordingTracker};
pub use store::{EditGuard, InMemoryTimerStore, TimerStore};
pub use timer::Timer;
