//! Clock abstraction so cadence can be tested without sleeping.

use std::thread;
use std::time::{Duration, Instant};

/// Source of monotonic time for the scheduler.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;

    /// Block for `duration`. Used when no key source is left to wait on.
    fn sleep(&self, duration: Duration);
}

/// Production implementation using the OS monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
