//! `FrameBuffer`: Cursor-tracked, single-syscall frame accumulator.

use super::width::char_width;
use std::io::{self, Write};

/// Erase entire screen, hide cursor.
const FRAME_PREAMBLE: &[u8] = b"\x1b[2J\x1b[?25l";

/// Pre-allocated buffer that holds one rendered frame.
///
/// The buffer tracks a virtual cursor against the terminal bounds so that
/// writes wrap at the right edge and stop at the bottom edge instead of
/// scrolling. All output is accumulated here, then flushed in a single
/// `write()` syscall to prevent terminal flickering.
///
/// Invariant: `x <= width` and `y < height` after every operation.
#[derive(Debug)]
pub struct FrameBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    x: usize,
    y: usize,
}

impl FrameBuffer {
    /// Create an empty frame buffer. Call [`reset`](Self::reset) before writing.
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(16 * 1024),
            width: 0,
            height: 0,
            x: 0,
            y: 0,
        }
    }

    /// Start a new frame of `width` x `height` cells.
    ///
    /// Truncates the accumulator, writes the clear-screen and hide-cursor
    /// preamble and homes the cursor.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is 0: nothing can be rendered into an
    /// empty terminal.
    pub fn reset(&mut self, width: usize, height: usize) {
        assert!(
            width > 0 && height > 0,
            "Invalid terminal size: {width} x {height}"
        );
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.extend_from_slice(FRAME_PREAMBLE);
        self.move_to(0, 0);
    }

    /// Terminal width in columns.
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Terminal height in rows.
    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Current cursor position as `(x, y)`, 0-based.
    #[inline]
    pub const fn cursor(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Whether `char_width` more columns fit without scrolling.
    ///
    /// Any row but the last can always continue on the next line; on the
    /// last row the write must end at or before the right edge.
    #[inline]
    pub const fn can_write(&self, char_width: usize) -> bool {
        self.y + 1 < self.height || self.x + char_width <= self.width
    }

    /// Append bytes the terminal interprets without moving the cursor
    /// (SGR sequences, for instance).
    #[inline]
    pub fn write_zero_width(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Move the cursor to `(x, y)`, clamped into the frame.
    pub fn move_to(&mut self, x: usize, y: usize) {
        self.x = x.min(self.width);
        self.y = y.min(self.height.saturating_sub(1));
        self.update_cursor();
    }

    /// Advance to the next tab stop (every 8 columns).
    ///
    /// A tab stop beyond the right edge becomes a line break. Returns
    /// `false` when that line break is impossible.
    pub fn tab(&mut self) -> bool {
        let next = self.x + 8 - self.x % 8;
        if next > self.width {
            return self.new_line();
        }
        self.x = next;
        self.update_cursor();
        true
    }

    /// Move to the start of the next row.
    ///
    /// Returns `false`, leaving the cursor untouched, when already on the
    /// last row.
    pub fn new_line(&mut self) -> bool {
        if self.y + 1 >= self.height {
            return false;
        }
        self.y += 1;
        self.x = 0;
        // The explicit reposition matters after a wide char at the right
        // edge, where terminals disagree on the cursor column.
        self.data.push(b'\n');
        self.update_cursor();
        true
    }

    /// Write one char, wrapping at the right edge.
    ///
    /// Returns `false` and writes nothing when the char no longer fits.
    pub fn write_rune(&mut self, ch: char) -> bool {
        let w = char_width(ch);
        if self.x + w > self.width && !self.new_line() {
            return false;
        }
        if self.x + w > self.width || !self.can_write(w) {
            return false;
        }
        let mut utf8 = [0u8; 4];
        self.data
            .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
        self.x += w;
        true
    }

    /// Write every char of `s`, stopping at the first one that does not fit.
    pub fn write_str(&mut self, s: &str) -> bool {
        s.chars().all(|ch| self.write_rune(ch))
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }

    /// CSI row ; col H for the current cursor (1-indexed for ANSI).
    fn update_cursor(&mut self) {
        // Writing into a Vec cannot fail.
        let _ = write!(self.data, "\x1b[{};{}H", self.y + 1, self.x + 1);
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
