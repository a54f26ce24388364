//! Escape classifier: decides, rune by rune, how child output reaches the
//! frame.
//!
//! | Input                 | Rendered as                                  |
//! |-----------------------|----------------------------------------------|
//! | `\n`, `\r`            | line break                                   |
//! | `\t`                  | next tab stop                                |
//! | other C0 control      | `^` + (`'@'` + code), e.g. `^G`              |
//! | DEL                   | the text `\x7f`                              |
//! | `ESC [ ... m` (SGR)   | passed through untouched, no columns used    |
//! | `ESC [ ... <other>`   | the text `\x1b[...` so it cannot move the cursor |
//! | `ESC` not before `[`  | `^[`                                         |
//! | anything else         | the char itself                              |

use super::runes::RuneReader;
use crate::terminal::FrameBuffer;
use std::io::Read;

const ESC: char = '\x1b';
const DEL: char = '\x7f';

/// Why rendering of one cycle stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The output ended (EOF or read failure).
    Exhausted,
    /// The frame ran out of space.
    Full,
}

/// Drives a [`FrameBuffer`] from a child's output stream.
///
/// Holds a scratch buffer for CSI sequences that is reused across cycles.
#[derive(Debug, Default)]
pub struct Classifier {
    csi: Vec<u8>,
}

impl Classifier {
    /// Create a classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `source` into `frame` until the source ends or the frame is
    /// full.
    pub fn render<R: Read>(&mut self, source: R, frame: &mut FrameBuffer) -> RenderOutcome {
        let mut rd = RuneReader::new(source);

        loop {
            if !frame.can_write(1) {
                return RenderOutcome::Full;
            }
            let Some(ch) = rd.read_rune() else {
                return RenderOutcome::Exhausted;
            };

            let written = match ch {
                // CR is a line break too.
                '\n' | '\r' => frame.new_line(),
                '\t' => frame.tab(),
                ESC if rd.peek_byte() == Some(b'[') => {
                    rd.read_rune();
                    match self.csi(&mut rd, frame) {
                        Some(written) => written,
                        // Truncated sequence: nothing more to read.
                        None => return RenderOutcome::Exhausted,
                    }
                }
                ESC => frame.write_str("^["),
                c if c < ' ' => {
                    frame.write_rune('^') && frame.write_rune(char::from(b'@' + c as u8))
                }
                DEL => frame.write_str("\\x7f"),
                c => frame.write_rune(c),
            };
            if !written {
                return RenderOutcome::Full;
            }
        }
    }

    /// Handle the rest of a CSI sequence; `ESC [` is already consumed.
    ///
    /// Returns `None` when the stream ends before the final byte, after
    /// rendering what was parsed as visible text.
    fn csi<R: Read>(
        &mut self,
        rd: &mut RuneReader<R>,
        frame: &mut FrameBuffer,
    ) -> Option<bool> {
        self.csi.clear();
        self.csi.extend_from_slice(b"\x1b[");

        // Parameter bytes 0x30-0x3F, then intermediate bytes 0x20-0x2F.
        for range in [0x30u8..=0x3f, 0x20..=0x2f] {
            while let Some(b) = rd.peek_byte().filter(|b| range.contains(b)) {
                rd.read_rune();
                self.csi.push(b);
            }
        }

        match rd.peek_byte() {
            None => {
                self.write_literal(frame);
                None
            }
            Some(b'm') => {
                rd.read_rune();
                self.csi.push(b'm');
                frame.write_zero_width(&self.csi);
                Some(true)
            }
            Some(last @ 0x40..=0x7e) => {
                rd.read_rune();
                self.csi.push(last);
                Some(self.write_literal(frame))
            }
            // Malformed: show what was parsed, then examine the byte normally.
            Some(_) => Some(self.write_literal(frame)),
        }
    }

    /// Render the collected sequence as visible text, `ESC` spelled `\x1b`.
    fn write_literal(&self, frame: &mut FrameBuffer) -> bool {
        let body = String::from_utf8_lossy(&self.csi[1..]);
        frame.write_str("\\x1b") && frame.write_str(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bytes of a fresh `width` x `height` frame, before any output.
    fn preamble(width: usize, height: usize) -> usize {
        let mut f = FrameBuffer::new();
        f.reset(width, height);
        f.as_bytes().len()
    }

    fn render(input: &[u8], width: usize, height: usize) -> (FrameBuffer, RenderOutcome) {
        let mut frame = FrameBuffer::new();
        frame.reset(width, height);
        let outcome = Classifier::new().render(input, &mut frame);
        (frame, outcome)
    }

    /// Everything written after the reset preamble.
    fn body(frame: &FrameBuffer) -> String {
        let start = preamble(frame.width(), frame.height());
        String::from_utf8_lossy(&frame.as_bytes()[start..]).into_owned()
    }

    fn screen(frame: &FrameBuffer) -> String {
        let mut parser = vt100::Parser::new(
            u16::try_from(frame.height()).unwrap(),
            u16::try_from(frame.width()).unwrap(),
            0,
        );
        parser.process(frame.as_bytes());
        parser.screen().contents()
    }

    #[test]
    fn test_plain_text() {
        let (frame, outcome) = render(b"hello", 20, 3);
        assert_eq!(outcome, RenderOutcome::Exhausted);
        assert_eq!(body(&frame), "hello");
        assert_eq!(frame.cursor(), (5, 0));
    }

    #[test]
    fn test_sgr_passthrough() {
        let (frame, _) = render(b"\x1b[31mx\x1b[0m", 20, 3);
        assert_eq!(body(&frame), "\x1b[31mx\x1b[0m");
        assert_eq!(frame.cursor(), (1, 0));
    }

    #[test]
    fn test_sgr_with_intermediate_and_private_params() {
        let (frame, _) = render(b"\x1b[?1;38;5;200 mz", 20, 3);
        assert_eq!(body(&frame), "\x1b[?1;38;5;200 mz");
        assert_eq!(frame.cursor(), (1, 0));
    }

    #[test]
    fn test_cursor_movement_is_neutralized() {
        let (frame, _) = render(b"\x1b[5;5H", 20, 3);
        assert_eq!(body(&frame), "\\x1b[5;5H");
        assert_eq!(frame.cursor(), (9, 0));
        assert_eq!(screen(&frame), "\\x1b[5;5H");
    }

    #[test]
    fn test_neutralized_sequence_wraps() {
        let (frame, _) = render(b"abcd\x1b[2J", 6, 3);
        assert_eq!(frame.cursor(), (5, 1));
        assert_eq!(screen(&frame), "abcd\\x\n1b[2J");
    }

    #[test]
    fn test_lone_escape() {
        let (frame, _) = render(b"\x1bPx", 20, 3);
        assert_eq!(body(&frame), "^[Px");
        assert_eq!(frame.cursor(), (4, 0));

        let (frame, outcome) = render(b"a\x1b", 20, 3);
        assert_eq!(outcome, RenderOutcome::Exhausted);
        assert_eq!(body(&frame), "a^[");
    }

    #[test]
    fn test_truncated_csi_renders_partial() {
        let (frame, outcome) = render(b"a\x1b[12;", 20, 3);
        assert_eq!(outcome, RenderOutcome::Exhausted);
        assert_eq!(body(&frame), "a\\x1b[12;");
    }

    #[test]
    fn test_malformed_csi_keeps_next_byte() {
        let (frame, _) = render(b"\x1b[1\nx", 20, 3);
        assert_eq!(body(&frame), "\\x1b[1\n\x1b[2;1Hx");
        assert_eq!(frame.cursor(), (1, 1));
    }

    #[test]
    fn test_control_chars() {
        let (frame, _) = render(b"\x07\x00\x1f", 20, 3);
        assert_eq!(body(&frame), "^G^@^_");
        assert_eq!(frame.cursor(), (6, 0));
    }

    #[test]
    fn test_del() {
        let (frame, _) = render(b"a\x7fb", 20, 3);
        assert_eq!(body(&frame), "a\\x7fb");
        assert_eq!(frame.cursor(), (6, 0));
    }

    #[test]
    fn test_newlines_and_carriage_returns() {
        let (frame, _) = render(b"a\nb\rc", 20, 3);
        assert_eq!(frame.cursor(), (1, 2));
        assert_eq!(screen(&frame), "a\nb\nc");
    }

    #[test]
    fn test_tab() {
        let (frame, _) = render(b"ab\tc", 20, 3);
        assert_eq!(frame.cursor(), (9, 0));
        assert_eq!(screen(&frame), "ab      c");
    }

    #[test]
    fn test_stops_when_rows_run_out() {
        let (frame, outcome) = render(b"1\n2\n3\n4\n", 5, 2);
        assert_eq!(outcome, RenderOutcome::Full);
        assert_eq!(frame.cursor(), (1, 1));
        assert_eq!(screen(&frame), "1\n2");
    }

    #[test]
    fn test_stops_at_right_edge_of_last_row() {
        let (frame, outcome) = render(b"abcdefghij", 4, 2);
        assert_eq!(outcome, RenderOutcome::Full);
        assert_eq!(frame.cursor(), (4, 1));
        assert_eq!(screen(&frame), "abcd\nefgh");
    }

    #[test]
    fn test_wide_chars() {
        let (frame, _) = render("日本語".as_bytes(), 5, 3);
        assert_eq!(frame.cursor(), (2, 1));
        assert_eq!(screen(&frame), "日本\n語");
    }

    #[test]
    fn test_invalid_utf8() {
        let (frame, _) = render(b"a\xffb", 20, 3);
        assert_eq!(body(&frame), "a\u{FFFD}b");
    }

    #[test]
    fn test_classifier_reuse() {
        let mut classifier = Classifier::new();
        let mut frame = FrameBuffer::new();
        frame.reset(20, 3);
        classifier.render(&b"\x1b[1;2;3;4;5;6;7;8m"[..], &mut frame);
        frame.reset(20, 3);
        classifier.render(&b"\x1b[0mok"[..], &mut frame);
        assert_eq!(body(&frame), "\x1b[0mok");
    }
}
