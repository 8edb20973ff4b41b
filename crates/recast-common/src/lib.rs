//! Common types and error definitions shared across the Recast crates.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ChannelNumber, EventId};
