//! UTF-8 rune decoding with one byte of lookahead.

use std::io::{ErrorKind, Read};

const READ_CHUNK: usize = 4096;

/// Decodes chars from a byte stream.
///
/// Invalid UTF-8 decodes to U+FFFD one byte at a time, so malformed output
/// never stalls the renderer. A read error is treated like the end of the
/// stream.
pub struct RuneReader<R> {
    inner: R,
    buf: Box<[u8]>,
    pos: usize,
    len: usize,
    eof: bool,
}

impl<R: Read> RuneReader<R> {
    /// Wrap a byte source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; READ_CHUNK].into_boxed_slice(),
            pos: 0,
            len: 0,
            eof: false,
        }
    }

    /// The next byte, without consuming it.
    pub fn peek_byte(&mut self) -> Option<u8> {
        self.fill(1);
        (self.pos < self.len).then(|| self.buf[self.pos])
    }

    /// Consume and decode the next char. `None` at end of stream.
    pub fn read_rune(&mut self) -> Option<char> {
        let lead = self.peek_byte()?;
        if lead.is_ascii() {
            self.pos += 1;
            return Some(char::from(lead));
        }

        let expected = match lead {
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => {
                self.pos += 1;
                return Some(char::REPLACEMENT_CHARACTER);
            }
        };
        self.fill(expected);
        let end = (self.pos + expected).min(self.len);
        if let Some(ch) = std::str::from_utf8(&self.buf[self.pos..end])
            .ok()
            .and_then(|s| s.chars().next())
        {
            self.pos = end;
            return Some(ch);
        }
        self.pos += 1;
        Some(char::REPLACEMENT_CHARACTER)
    }

    /// Ensure at least `need` unread bytes are buffered, unless the stream
    /// ends first.
    fn fill(&mut self, need: usize) {
        if self.len - self.pos >= need || self.eof {
            return;
        }
        if self.pos > 0 {
            self.buf.copy_within(self.pos..self.len, 0);
            self.len -= self.pos;
            self.pos = 0;
        }
        while self.len < need {
            match self.inner.read(&mut self.buf[self.len..]) {
                Ok(0) => {
                    self.eof = true;
                    return;
                }
                Ok(n) => self.len += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::debug!("output read failed: {e}");
                    self.eof = true;
                    return;
                }
            }
        }
    }
}
