//! The repeat loop: run a target on a cadence and react to single-key
//! commands between runs.
//!
//! ```text
//!            +---------+  cycle done, times left  +----------+
//!     start->| Running |------------------------->| Awaiting |
//!            +---------+<-------------------------+----------+
//!              ^   |       deadline / Enter / +/-      |
//!              |   | paused                        space
//!              |   v                                   v
//!              | +--------+<---------------------------+
//!              +-| Paused |
//!         space  +--------+      q / Ctrl-C from any wait -> Stopped
//! ```

mod clock;
mod schedule;

pub use clock::{Clock, SystemClock};
pub use schedule::Schedule;

use crate::error::Result;
use crate::terminal::ReadError;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Shortest interval the `-` key or the command line can select.
pub const MIN_INTERVAL: Duration = Duration::from_millis(500);

/// How much `+` and `-` change the interval.
pub const INTERVAL_STEP: Duration = Duration::from_millis(500);

/// How long a paused loop waits for a key before checking again.
const PAUSE_WAIT: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

const CTRL_C: u8 = 0x03;

/// A single-byte keyboard reader with a timeout.
pub trait KeySource {
    /// Wait up to `timeout` for the next key byte.
    ///
    /// # Errors
    ///
    /// [`ReadError::TimedOut`] if no key arrived in time,
    /// [`ReadError::Closing`] if the source is shutting down.
    fn read_byte(&mut self, timeout: Duration) -> std::result::Result<u8, ReadError>;
}

/// Something the loop runs every cycle.
pub trait Repeatable {
    /// Execute one cycle.
    ///
    /// # Errors
    ///
    /// Any error stops the loop and is returned from [`Repeater::run`].
    fn run(&mut self) -> Result<()>;

    /// Show the key hint after an unrecognized key.
    fn show_help(&mut self);

    /// Show the hint telling how to leave the paused state.
    fn show_resume_help(&mut self);

    /// Current delay between cycles.
    fn interval(&self) -> Duration;

    /// Change the delay between cycles.
    fn set_interval(&mut self, interval: Duration);
}

/// Raise `interval` to [`MIN_INTERVAL`] if it is shorter.
pub fn clamp_interval(interval: Duration) -> Duration {
    interval.max(MIN_INTERVAL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Awaiting(Instant),
    Paused,
    Stopped,
}

/// Drives a [`Repeatable`] until it has run `times` cycles or the user
/// quits.
#[derive(Debug, Clone, Copy)]
pub struct Repeater {
    precise: bool,
    times: i64,
}

impl Repeater {
    /// A repeater that runs `times` cycles (negative means forever). With
    /// `precise`, cycle starts are spaced from each other rather than from
    /// the end of the previous run.
    pub const fn new(precise: bool, times: i64) -> Self {
        Self { precise, times }
    }

    /// Run the loop to completion.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Repeatable::run`].
    pub fn run<T, K, C>(&self, target: &mut T, keys: &mut K, clock: &C) -> Result<()>
    where
        T: Repeatable + ?Sized,
        K: KeySource + ?Sized,
        C: Clock + ?Sized,
    {
        if self.times == 0 {
            return Ok(());
        }

        let mut schedule = Schedule::new(self.precise, clock.now());
        let mut paused = false;
        let mut keys_open = true;
        let mut cycles: i64 = 0;
        let mut state = State::Running;

        loop {
            state = match state {
                State::Running => {
                    schedule.begin_cycle();
                    target.run()?;
                    schedule.end_cycle(clock.now());
                    cycles += 1;
                    trace!(cycles, "cycle finished");

                    if self.times > 0 && cycles >= self.times {
                        State::Stopped
                    } else if paused {
                        pause(target)
                    } else {
                        State::Awaiting(schedule.next_deadline(target.interval()))
                    }
                }
                State::Awaiting(deadline) => {
                    let now = clock.now();
                    if deadline <= now {
                        State::Running
                    } else if !keys_open {
                        clock.sleep(deadline - now);
                        State::Running
                    } else {
                        match keys.read_byte(deadline - now) {
                            Ok(key) => {
                                on_key(key, state, &mut paused, &mut schedule, target, clock)
                            }
                            Err(ReadError::TimedOut) => State::Running,
                            Err(ReadError::Closing) => {
                                debug!("key input closed, keeping the schedule without keys");
                                keys_open = false;
                                state
                            }
                        }
                    }
                }
                State::Paused => match keys.read_byte(PAUSE_WAIT) {
                    Ok(key) => on_key(key, state, &mut paused, &mut schedule, target, clock),
                    Err(ReadError::TimedOut) => State::Running,
                    Err(ReadError::Closing) => {
                        // Nothing could ever resume the loop.
                        debug!("key input closed while paused, resuming");
                        keys_open = false;
                        paused = false;
                        schedule.force_refresh(clock.now());
                        State::Running
                    }
                },
                State::Stopped => return Ok(()),
            };
        }
    }
}

fn pause<T: Repeatable + ?Sized>(target: &mut T) -> State {
    target.show_resume_help();
    State::Paused
}

/// Apply one key press to the loop. `waiting` is the state the key arrived
/// in and is kept when the key means nothing.
fn on_key<T, C>(
    key: u8,
    waiting: State,
    paused: &mut bool,
    schedule: &mut Schedule,
    target: &mut T,
    clock: &C,
) -> State
where
    T: Repeatable + ?Sized,
    C: Clock + ?Sized,
{
    trace!(key, "key pressed");
    let mut refresh = || {
        schedule.force_refresh(clock.now());
        State::Running
    };

    match key {
        b'q' | CTRL_C => State::Stopped,
        b'\n' | b'\r' => refresh(),
        b'+' => {
            target.set_interval(target.interval() + INTERVAL_STEP);
            refresh()
        }
        b'-' => {
            let shorter = target.interval().saturating_sub(INTERVAL_STEP);
            target.set_interval(clamp_interval(shorter));
            refresh()
        }
        b' ' if *paused => {
            *paused = false;
            refresh()
        }
        b' ' => {
            *paused = true;
            pause(target)
        }
        _ => {
            target.show_help();
            waiting
        }
    }
}
