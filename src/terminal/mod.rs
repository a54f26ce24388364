//! Terminal plumbing: display widths, the frame buffer, raw-mode input and
//! size discovery.

mod frame;
mod session;
pub mod width;

pub use frame::FrameBuffer;
pub use session::{RawSession, ReadError};

use crate::error::{Error, Result};
use std::io;

/// Terminal size as `(width, height)`.
///
/// A forced dimension greater than zero wins; the other one is asked from
/// the terminal.
///
/// # Errors
///
/// Returns [`Error::TerminalSize`] when a dimension has to be detected and
/// detection fails or reports zero.
pub fn terminal_size(forced_width: u16, forced_height: u16) -> Result<(usize, usize)> {
    resolve_size(forced_width, forced_height, crossterm::terminal::size)
}

fn resolve_size(
    forced_width: u16,
    forced_height: u16,
    detect: impl FnOnce() -> io::Result<(u16, u16)>,
) -> Result<(usize, usize)> {
    if forced_width > 0 && forced_height > 0 {
        return Ok((usize::from(forced_width), usize::from(forced_height)));
    }
    let (cols, rows) = detect().map_err(Error::TerminalSize)?;
    let width = if forced_width > 0 { forced_width } else { cols };
    let height = if forced_height > 0 { forced_height } else { rows };
    if width == 0 || height == 0 {
        return Err(Error::TerminalSize(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("terminal reported {width} x {height}"),
        )));
    }
    Ok((usize::from(width), usize::from(height)))
}
