//! Periodic triggers for the cooperative run loop

use std::time::{Duration, Instant};

/// A fixed-interval trigger that can be armed and disarmed
///
/// The trigger never fires on its own; the run loop asks it with
/// [`PeriodicTrigger::fire_if_due`] and sleeps until [`PeriodicTrigger::deadline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTrigger {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTrigger {
    /// Create a disarmed trigger
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the trigger; the first firing is one interval after `now`
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Next firing time, if armed
    pub fn deadline(&self) -> Option<Instant> {
        self.next_due
    }

    /// Returns true and re-arms if the trigger is due at `now`
    ///
    /// Missed periods are not replayed: the next deadline is one interval
    /// after `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
