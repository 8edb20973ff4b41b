//! Recording control boundary.

use std::sync::Mutex;
use tracing::{debug, info};

use crate::timer::Timer;

/// Signals into the recording subsystem.
pub trait RecordingControl: Send + Sync {
    /// Ask the in-progress recording for this timer to stop.
    fn stop(&self, timer: &Timer);

    /// Re-evaluate recording state after a timer was skipped or removed.
    fn reprocess(&self);
}

/// In-memory recording control that remembers the stop signals it saw.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    stopped: Mutex<Vec<String>>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files of the recordings that were asked to stop, oldest first.
    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }
}

impl RecordingControl for RecordingTracker {
    fn stop(&self, timer: &Timer) {
        info!(file = %timer.file, "stop signal for in-progress recording");
        self.stopped.lock().unwrap().push(timer.file.clone());
    }

    fn reprocess(&self) {
        debug!("recording control reprocess requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_remembers_stop_signals() {
        let tracker = RecordingTracker::new();
        let timer = Timer {
            file: "Evening News".to_string(),
            ..Timer::default()
        };

        tracker.stop(&timer);
        tracker.reprocess();

        assert_eq!(tracker.stopped(), vec!["Evening News".to_string()]);
    }
}
