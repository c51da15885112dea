use std::time::Duration;

use serde::Deserialize;

/// What a poller does when its timer fires while the previous invocation
/// of its task is still running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Dispatch anyway. Slow tasks can pile up behind a fast timer.
    #[default]
    Allow,

    /// Drop the tick and wait for the next one.
    SkipWhileInFlight,
}

/// Timer configuration of one poller registration.
///
/// `active_interval` is expected to be shorter than `idle_interval`, but
/// nothing enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    pub active_interval: Duration,
    pub idle_interval: Duration,

    /// Invoke the task immediately on every registration.
    pub run_on_mount: bool,
    pub overlap: OverlapPolicy,
}

impl PollSpec {
    pub fn new(active_interval: Duration, idle_interval: Duration) -> Self {
        Self {
            active_interval,
            idle_interval,
            run_on_mount: true,
            overlap: OverlapPolicy::Allow,
        }
    }

    pub fn with_run_on_mount(mut self, run_on_mount: bool) -> Self {
        self.run_on_mount = run_on_mount;
        self
    }

    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    /// Timer period for the given activity.
    pub fn period(&self, is_active: bool) -> Duration {
        if is_active {
            self.active_interval
        } else {
            self.idle_interval
        }
    }
}
