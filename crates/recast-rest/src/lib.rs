//! REST interface for Recast recording timers.

pub mod api;
pub mod descriptor;
pub mod handlers;
pub mod list;
pub mod values;

pub use api::{ListQuery, TimerForm, TimersApi};
pub use descriptor::{build_descriptor, TimerFields};
pub use list::{SerTimer, TimerListFormat};
