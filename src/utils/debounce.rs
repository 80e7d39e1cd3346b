//! Cancellable debounce timer
//!
//! The engine never reads a clock of its own (SystemTime is not supported
//! under WASM); the host supplies millisecond timestamps and drives expiry
//! through tick calls. Scheduling is cancel-and-reschedule: arming the
//! timer again invalidates any pending deadline, so at most one callback
//! is ever pending per timer.

use serde::{Deserialize, Serialize};

/// A single-deadline debounce timer driven by host timestamps
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct DebounceTimer {
    /// Absolute deadline in host milliseconds, if armed
    deadline_ms: Option<f64>,
    /// Timestamp of the arming mutation, kept for the eventual commit
    armed_at_ms: Option<f64>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer. A pending deadline is replaced.
    pub fn arm(&mut self, now_ms: f64, quiet_period_ms: f64) {
        if self.armed_at_ms.is_none() {
            self.armed_at_ms = Some(now_ms);
        }
        self.deadline_ms = Some(now_ms + quiet_period_ms);
    }

    /// Cancel any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline_ms = None;
        self.armed_at_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Timestamp of the first mutation in the current quiet period.
    pub fn armed_at(&self) -> Option<f64> {
        self.armed_at_ms
    }

    /// Consume the deadline if it has elapsed. Returns the arming
    /// timestamp so the caller can stamp whatever the timer gated.
    pub fn fire_if_due(&mut self, now_ms: f64) -> Option<f64> {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                let armed_at = self.armed_at_ms.unwrap_or(deadline);
                self.cancel();
                Some(armed_at)
            }
            _ => None,
        }
    }
}
