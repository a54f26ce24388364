//! # Gaze
//!
//! Repeat a command and redraw its output in place, like `watch(1)`, with
//! the command's colors intact.
//!
//! ## Core Concepts
//!
//! - **Single-write frames**: every cycle is built in a [`FrameBuffer`] and
//!   sent to the terminal with one write
//! - **Escape classification**: SGR sequences pass through; any other CSI
//!   is shown as text so the command cannot move the cursor
//! - **Repeat loop**: a small state machine over injected [`Clock`],
//!   [`KeySource`] and [`Repeatable`] seams
//! - **Raw session**: raw mode plus an input thread, restored on drop
//!
//! ## Example
//!
//! ```rust,ignore
//! use gaze::{Gazer, GazeOptions, RawSession, Repeater, SystemClock};
//!
//! let options = GazeOptions { command: vec!["date".into()], ..Default::default() };
//! let mut session = RawSession::begin()?;
//! let mut gazer = Gazer::new(options, std::io::stdout());
//! Repeater::new(false, -1).run(&mut gazer, &mut session, &SystemClock)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod command;
pub mod config;
pub mod error;
pub mod gazer;
pub mod logging;
pub mod render;
pub mod repeater;
pub mod terminal;

// Re-exports for convenience
pub use config::{Cli, GazeOptions};
pub use error::{Error, Result};
pub use gazer::Gazer;
pub use render::{Classifier, RenderOutcome};
pub use repeater::{Clock, KeySource, Repeatable, Repeater, SystemClock};
pub use terminal::{FrameBuffer, RawSession, ReadError};
