//! Trailing-edge throttle driven by an injected clock.

use std::time::{Duration, Instant};

/// Coalesces calls into one trailing firing per window.
///
/// The first [`Throttle::call`] arms a deadline `window` in the future; calls
/// that arrive while armed are absorbed. The owner polls with
/// [`Throttle::fire_due`] and runs the deferred work when it returns `true`.
/// Dropping the throttle drops its deadline, so nothing outlives the owner.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    deadline: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Registers a call at `now`. Returns `true` if this call armed the timer.
    pub fn call(&mut self, now: Instant) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + self.window);
        true
    }

    /// Consumes the pending call if its deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Consumes the pending call regardless of the deadline.
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Drops a pending call without firing it.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
