//! `gaze` entrypoint: parse flags, take over the terminal, run the repeat
//! loop and give the terminal back.

use anyhow::{Context, Result};
use clap::Parser;
use gaze::{logging, Cli, GazeOptions, Gazer, RawSession, Repeater, SystemClock};
use std::io;
use tracing::{debug, error, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = logging::init(cli.debug) {
        debug!(path = %path.display(), "logging to file");
    }

    let result = run(GazeOptions::from(cli));
    if let Err(ref e) = result {
        error!("exit with error: {e:#}");
    }
    result
}

/// Run the loop inside a raw session. Both are torn down before this
/// returns, so errors are reported on a restored terminal.
fn run(options: GazeOptions) -> Result<()> {
    debug!(?options, "starting");
    let repeater = Repeater::new(options.precise, options.repeat);

    let mut session = RawSession::begin().context("failed to set up the terminal")?;
    if !session.is_interactive() {
        warn!("stdin is not a terminal, keys are ignored");
    }
    let mut gazer = Gazer::new(options, io::stdout());

    let result = repeater
        .run(&mut gazer, &mut session, &SystemClock)
        .context("failed to update the screen");

    // Cursor back while still in raw mode, then leave raw mode.
    let finished = gazer.finish();
    session.end();
    result?;
    finished.context("failed to restore the cursor")
}
