//! One cycle of gaze: clear, header, child output, flush.

use crate::command::{display_command, exec_command, ChildOutput};
use crate::config::GazeOptions;
use crate::error::Result;
use crate::render::header::write_header;
use crate::render::Classifier;
use crate::repeater::{clamp_interval, Repeatable};
use crate::terminal::{terminal_size, FrameBuffer};
use chrono::{DateTime, Local};
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Hint shown after a key gaze does not know.
pub const HELP_HINT: &str = "Keys: [q] quit  [Enter] refresh  [+/-] interval  [space] pause";

/// Hint shown while paused.
pub const RESUME_HINT: &str = "Paused. [space] resume  [q] quit";

/// Produces the byte stream of one run of the watched command.
pub type Fetcher = Box<dyn FnMut() -> Result<Box<dyn Read>>>;

/// Wall-clock time shown in the header.
pub type WallClock = fn() -> DateTime<Local>;

/// Repaints the terminal with the watched command's output.
///
/// Each [`run`](Repeatable::run) builds the whole frame in memory and sends
/// it with one write. [`finish`](Self::finish) shows the cursor again and
/// runs on drop if not called earlier.
pub struct Gazer<W: Write> {
    options: GazeOptions,
    title: String,
    frame: FrameBuffer,
    classifier: Classifier,
    header: String,
    fetcher: Fetcher,
    wall_clock: WallClock,
    out: W,
    finished: bool,
}

impl<W: Write> Gazer<W> {
    /// A gazer that runs `options.command` each cycle and paints into `out`.
    pub fn new(options: GazeOptions, out: W) -> Self {
        let argv = exec_command(&options.command, options.use_exec);
        let fetcher: Fetcher = Box::new(move || {
            let child = ChildOutput::spawn(&argv)?;
            Ok(Box::new(child) as Box<dyn Read>)
        });
        Self::with_fetcher(options, out, fetcher)
    }

    /// A gazer that takes each cycle's output from `fetcher`.
    pub fn with_fetcher(options: GazeOptions, out: W, fetcher: Fetcher) -> Self {
        let title = display_command(&options.command);
        Self {
            options,
            title,
            frame: FrameBuffer::new(),
            classifier: Classifier::new(),
            header: String::new(),
            fetcher,
            wall_clock: Local::now,
            out,
            finished: false,
        }
    }

    /// Take header timestamps from `wall_clock` instead of the system clock.
    #[must_use]
    pub fn with_wall_clock(mut self, wall_clock: WallClock) -> Self {
        self.wall_clock = wall_clock;
        self
    }

    /// The header title: the command, shell-quoted.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The output sink.
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Show the cursor again and move below the last frame.
    ///
    /// Idempotent.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.write_all(b"\x1b[?25h\r\n")?;
        self.out.flush()
    }

    /// Draw `hint` in reverse video on the bottom row.
    fn show_hint(&mut self, hint: &str) {
        let (width, height) = (self.frame.width(), self.frame.height());
        if width == 0 || height == 0 {
            return;
        }
        // Hints are ASCII, so bytes are columns.
        let shown = &hint[..hint.len().min(width)];
        let result = write!(self.out, "\x1b[{height};1H\x1b[2K\x1b[7m{shown}\x1b[0m")
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!("unable to show hint: {e}");
        }
    }
}

impl<W: Write> Repeatable for Gazer<W> {
    fn run(&mut self) -> Result<()> {
        let (width, height) = terminal_size(self.options.width, self.options.height)?;
        self.frame.reset(width, height);
        debug!(width, height, "cycle started");

        let mut output = (self.fetcher)()?;

        if !self.options.no_title {
            let now = (self.wall_clock)();
            write_header(&mut self.header, width, self.options.interval, &now, &self.title);
            self.frame.write_str(&self.header);
            self.frame.new_line();
        }

        let outcome = self.classifier.render(&mut output, &mut self.frame);
        trace!(?outcome, bytes = self.frame.as_bytes().len(), "frame rendered");
        self.frame.flush_to(&mut self.out)?;

        // Reaps the child; the screen is already up to date.
        drop(output);
        Ok(())
    }

    fn show_help(&mut self) {
        self.show_hint(HELP_HINT);
    }

    fn show_resume_help(&mut self) {
        self.show_hint(RESUME_HINT);
    }

    fn interval(&self) -> Duration {
        self.options.interval
    }

    fn set_interval(&mut self, interval: Duration) {
        self.options.interval = clamp_interval(interval);
        debug!(interval = ?self.options.interval, "interval changed");
    }
}

impl<W: Write> Drop for Gazer<W> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!("unable to restore cursor: {e}");
        }
    }
}
