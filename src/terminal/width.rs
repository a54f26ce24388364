//! Display width of code points.
//!
//! Every code point occupies one or two columns. Zero-width and control
//! characters count as one column, and East Asian ambiguous-width glyphs
//! are always narrow.

use unicode_width::UnicodeWidthChar;

/// Number of terminal columns `ch` occupies: always 1 or 2.
#[inline]
pub fn char_width(ch: char) -> usize {
    // `width()` already resolves ambiguous glyphs as narrow; `width_cjk()`
    // would widen them.
    match ch.width() {
        Some(2) => 2,
        _ => 1,
    }
}

/// Sum of [`char_width`] over every char of `s`.
pub fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_narrow() {
        for ch in ' '..='~' {
            assert_eq!(char_width(ch), 1, "{ch:?}");
        }
    }

    #[test]
    fn test_cjk_is_wide() {
        assert_eq!(char_width('日'), 2);
        assert_eq!(char_width('本'), 2);
        assert_eq!(char_width('Ａ'), 2); // Fullwidth A
    }

    #[test]
    fn test_ambiguous_is_narrow() {
        // Greek, box drawing and circled digits are ambiguous in East Asian Width.
        assert_eq!(char_width('α'), 1);
        assert_eq!(char_width('─'), 1);
        assert_eq!(char_width('①'), 1);
    }

    #[test]
    fn test_zero_width_and_control_count_as_one() {
        assert_eq!(char_width('\u{0301}'), 1); // Combining acute accent
        assert_eq!(char_width('\u{200B}'), 1); // Zero width space
        assert_eq!(char_width('\0'), 1);
        assert_eq!(char_width('\x1b'), 1);
    }

    #[test]
    fn test_width_is_one_or_two() {
        for cp in (0u32..0x3_0000).step_by(7) {
            if let Some(ch) = char::from_u32(cp) {
                let w = char_width(ch);
                assert!(w == 1 || w == 2, "U+{cp:04X} has width {w}");
            }
        }
    }

    #[test]
    fn test_str_width() {
        assert_eq!(str_width(""), 0);
        assert_eq!(str_width("Every 1s: ls"), 12);
        assert_eq!(str_width("日本語"), 6);
        assert_eq!(str_width("a日b"), 4);
    }
}
