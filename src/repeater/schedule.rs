//! Cadence bookkeeping: when should the next cycle start?

use std::time::{Duration, Instant};

/// Start and end times of the last cycle, and the next expected start.
///
/// In precise mode the next start is anchored to the previous *expected*
/// start, so run time never accumulates as drift. Otherwise it follows the
/// previous cycle's end and slips by the run duration each cycle.
#[derive(Debug, Clone)]
pub struct Schedule {
    precise: bool,
    next_expected_start: Instant,
    last_expected_start: Instant,
    last_end: Instant,
}

impl Schedule {
    /// A schedule whose first cycle is due at `now`.
    pub const fn new(precise: bool, now: Instant) -> Self {
        Self {
            precise,
            next_expected_start: now,
            last_expected_start: now,
            last_end: now,
        }
    }

    /// Record that the due cycle is starting.
    pub const fn begin_cycle(&mut self) {
        self.last_expected_start = self.next_expected_start;
    }

    /// Record that the running cycle finished at `end`.
    pub const fn end_cycle(&mut self, end: Instant) {
        self.last_end = end;
    }

    /// Compute, store and return the start of the next cycle.
    pub fn next_deadline(&mut self, interval: Duration) -> Instant {
        let base = if self.precise {
            self.last_expected_start
        } else {
            self.last_end
        };
        self.next_expected_start = base + interval;
        self.next_expected_start
    }

    /// Make the next cycle due at `now`. The cadence continues from there.
    pub const fn force_refresh(&mut self, now: Instant) {
        self.next_expected_start = now;
    }

    /// When the last cycle was expected to start.
    pub const fn last_expected_start(&self) -> Instant {
        self.last_expected_start
    }

    /// When the last cycle ended.
    pub const fn last_end(&self) -> Instant {
        self.last_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);
    const RUN: Duration = Duration::from_millis(300);

    /// Start times of `cycles` back-to-back cycles that each take `RUN`.
    fn starts(precise: bool, cycles: u32) -> Vec<Duration> {
        let t0 = Instant::now();
        let mut schedule = Schedule::new(precise, t0);
        let mut out = Vec::new();
        for _ in 0..cycles {
            schedule.begin_cycle();
            let start = schedule.last_expected_start();
            out.push(start - t0);
            schedule.end_cycle(start + RUN);
            schedule.next_deadline(SEC);
        }
        out
    }

    #[test]
    fn test_precise_does_not_drift() {
        let expected: Vec<_> = (0..10).map(|k| SEC * k).collect();
        assert_eq!(starts(true, 10), expected);
    }

    #[test]
    fn test_non_precise_follows_run_end() {
        let expected: Vec<_> = (0..10).map(|k| (SEC + RUN) * k).collect();
        assert_eq!(starts(false, 10), expected);
    }

    #[test]
    fn test_force_refresh_moves_base() {
        let t0 = Instant::now();
        let mut schedule = Schedule::new(true, t0);
        schedule.begin_cycle();
        schedule.end_cycle(t0 + RUN);
        assert_eq!(schedule.next_deadline(SEC), t0 + SEC);

        schedule.force_refresh(t0 + RUN * 2);
        schedule.begin_cycle();
        assert_eq!(schedule.last_expected_start(), t0 + RUN * 2);
        assert_eq!(schedule.next_deadline(SEC), t0 + RUN * 2 + SEC);
    }

    #[test]
    fn test_last_end() {
        let t0 = Instant::now();
        let mut schedule = Schedule::new(false, t0);
        schedule.end_cycle(t0 + RUN);
        assert_eq!(schedule.last_end(), t0 + RUN);
        assert_eq!(schedule.next_deadline(SEC), t0 + RUN + SEC);
    }
}
