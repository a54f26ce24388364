//! Command line flags and the options the core consumes.

use crate::repeater::MIN_INTERVAL;
use clap::{ArgAction, Parser};
use std::time::Duration;

/// Interval used when `-n` is not given.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Execute a program periodically, showing its output fullscreen, colors
/// included.
#[derive(Debug, Parser, Clone)]
#[command(name = "gaze", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Seconds to wait between updates (minimum 0.5)
    #[arg(
        short = 'n',
        long = "interval",
        value_name = "SECONDS",
        default_value = "2",
        value_parser = parse_interval
    )]
    pub interval: Duration,

    /// Run the command every interval, regardless of how long it takes
    #[arg(short = 'p', long = "precise", default_value_t = false)]
    pub precise: bool,

    /// Hide the header line
    #[arg(short = 't', long = "no-title", default_value_t = false)]
    pub no_title: bool,

    /// Run the command directly instead of through `sh -c`
    #[arg(short = 'x', long = "exec", default_value_t = false)]
    pub exec: bool,

    /// Number of updates before exiting (negative = forever)
    #[arg(
        short = 'r',
        long = "repeat",
        value_name = "N",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    pub repeat: i64,

    /// Force the terminal width (0 = detect)
    #[arg(long = "width", value_name = "COLUMNS", default_value_t = 0)]
    pub width: u16,

    /// Force the terminal height (0 = detect)
    #[arg(long = "height", value_name = "ROWS", default_value_t = 0)]
    pub height: u16,

    /// Accepted for compatibility; colors are always kept
    #[arg(short = 'c', long = "color", action = ArgAction::SetTrue)]
    pub color: bool,

    /// Write debug logs (see GAZE_LOG and GAZE_LOG_FILE)
    #[arg(short = 'd', long = "debug", default_value_t = false)]
    pub debug: bool,

    /// Command to run, with its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Options for one gaze run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazeOptions {
    /// Command words as given by the user.
    pub command: Vec<String>,
    /// Delay between updates, never below [`MIN_INTERVAL`].
    pub interval: Duration,
    /// Space cycle starts evenly instead of following run ends.
    pub precise: bool,
    /// Skip the header line.
    pub no_title: bool,
    /// Execute the words directly instead of via `/bin/sh -c`.
    pub use_exec: bool,
    /// Forced width, 0 to detect.
    pub width: u16,
    /// Forced height, 0 to detect.
    pub height: u16,
    /// Cycles to run; negative runs until quit, 0 runs none.
    pub repeat: i64,
}

impl Default for GazeOptions {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            interval: DEFAULT_INTERVAL,
            precise: false,
            no_title: false,
            use_exec: false,
            width: 0,
            height: 0,
            repeat: -1,
        }
    }
}

impl From<Cli> for GazeOptions {
    fn from(cli: Cli) -> Self {
        Self {
            command: cli.command,
            interval: cli.interval,
            precise: cli.precise,
            no_title: cli.no_title,
            use_exec: cli.exec,
            width: cli.width,
            height: cli.height,
            repeat: cli.repeat,
        }
    }
}

/// Convert a seconds value to an interval, raised to [`MIN_INTERVAL`].
pub fn interval_from_secs(secs: f64) -> Result<Duration, String> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!(
            "interval must be a non-negative number of seconds, got {secs}"
        ));
    }
    let interval =
        Duration::try_from_secs_f64(secs).map_err(|e| format!("interval {secs}: {e}"))?;
    Ok(interval.max(MIN_INTERVAL))
}

/// Both `.` and `,` work as the decimal separator.
fn parse_interval(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("invalid interval '{raw}'"))?;
    interval_from_secs(secs)
}
