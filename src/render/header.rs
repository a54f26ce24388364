//! Header line: `Every <interval>: <command>` on the left, timestamp on the
//! right.

use crate::terminal::width::str_width;
use chrono::{DateTime, TimeZone};
use std::fmt::{Display, Write};
use std::time::Duration;

/// `2006/01/02 15:04:05.000 -0700`, always 29 columns.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f %z";

/// Build the header for a `width`-column terminal into `out`.
///
/// The title part is kept only when at least one space separates it from
/// the timestamp. Otherwise the timestamp alone is right-aligned, or cut to
/// its first `width` characters on very narrow terminals.
pub fn write_header<Tz>(
    out: &mut String,
    width: usize,
    interval: Duration,
    now: &DateTime<Tz>,
    title: &str,
) where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();

    out.clear();
    let _ = write!(out, "Every {}: {title}", format_interval(interval));

    let used = str_width(out) + timestamp.len();
    if width > used {
        pad(out, width - used);
        out.push_str(&timestamp);
        return;
    }

    // Not enough space; just print the timestamp.
    out.clear();
    if timestamp.len() > width {
        out.push_str(&timestamp[..width]);
    } else {
        pad(out, width - timestamp.len());
        out.push_str(&timestamp);
    }
}

fn pad(out: &mut String, n: usize) {
    out.extend(std::iter::repeat_n(' ', n));
}

/// Format a duration the way Go's `time.Duration` prints: `500ms`, `1.5s`,
/// `2m0s`, `1h0m0s`.
pub fn format_interval(d: Duration) -> String {
    let nanos = d.as_nanos();
    match nanos {
        0 => "0s".to_string(),
        1..=999 => format!("{nanos}ns"),
        1_000..=999_999 => format!("{}µs", decimal(nanos, 1_000)),
        1_000_000..=999_999_999 => format!("{}ms", decimal(nanos, 1_000_000)),
        _ => {
            let secs = d.as_secs();
            let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
            let mut out = String::new();
            if hours > 0 {
                let _ = write!(out, "{hours}h");
            }
            if hours > 0 || minutes > 0 {
                let _ = write!(out, "{minutes}m");
            }
            let rest = u128::from(seconds) * 1_000_000_000 + u128::from(d.subsec_nanos());
            let _ = write!(out, "{}s", decimal(rest, 1_000_000_000));
            out
        }
    }
}

/// `value / unit` with the fraction's trailing zeros removed.
fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = unit.ilog10() as usize;
    let frac = format!("{frac:0digits$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn reference_time() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2006, 1, 2, 15, 4, 5)
            .unwrap()
    }

    fn header(width: usize, interval_ms: u64, title: &str) -> String {
        let mut out = String::new();
        write_header(
            &mut out,
            width,
            Duration::from_millis(interval_ms),
            &reference_time(),
            title,
        );
        out
    }

    #[test]
    fn test_timestamp_is_29_columns() {
        let stamp = reference_time().format(TIMESTAMP_FORMAT).to_string();
        assert_eq!(stamp, "2006/01/02 15:04:05.000 -0700");
        assert_eq!(stamp.len(), 29);
    }

    #[test]
    fn test_header_truncation() {
        let cases = [
            (0, 1000, "title", ""),
            (1, 1000, "title", "2"),
            (2, 1000, "title", "20"),
            (28, 1000, "title", "2006/01/02 15:04:05.000 -070"),
            (29, 1000, "title", "2006/01/02 15:04:05.000 -0700"),
            (30, 1000, "title", " 2006/01/02 15:04:05.000 -0700"),
            (31, 1000, "title", "  2006/01/02 15:04:05.000 -0700"),
            (60, 1000, "title", "Every 1s: title                2006/01/02 15:04:05.000 -0700"),
            (50, 1000, "title", "Every 1s: title      2006/01/02 15:04:05.000 -0700"),
            (50, 1500, "title", "Every 1.5s: title    2006/01/02 15:04:05.000 -0700"),
            (50, 500, "title", "Every 500ms: title   2006/01/02 15:04:05.000 -0700"),
            (50, 500, "title12", "Every 500ms: title12 2006/01/02 15:04:05.000 -0700"),
            (50, 500, "title123", "                     2006/01/02 15:04:05.000 -0700"),
        ];
        for (width, interval_ms, title, expected) in cases {
            assert_eq!(header(width, interval_ms, title), expected, "W={width} T={title}");
        }
    }

    #[test]
    fn test_header_fills_width() {
        for width in 0..80 {
            assert_eq!(str_width(&header(width, 2000, "ls -l")), width);
        }
    }

    #[test]
    fn test_header_counts_wide_title_columns() {
        // "Every 2s: 日本" is 14 columns; 14 + 29 + 1 space = 44.
        assert!(header(44, 2000, "日本").starts_with("Every 2s: 日本 2006"));
        assert!(header(43, 2000, "日本").starts_with("              2006"));
    }

    #[test]
    fn test_format_interval() {
        let cases = [
            (Duration::ZERO, "0s"),
            (Duration::from_nanos(12), "12ns"),
            (Duration::from_micros(1500), "1.5ms"),
            (Duration::from_nanos(2500), "2.5µs"),
            (Duration::from_millis(500), "500ms"),
            (Duration::from_secs(1), "1s"),
            (Duration::from_millis(1500), "1.5s"),
            (Duration::from_millis(2250), "2.25s"),
            (Duration::from_secs(90), "1m30s"),
            (Duration::from_secs(120), "2m0s"),
            (Duration::from_secs(3600), "1h0m0s"),
            (Duration::from_millis(3_661_500), "1h1m1.5s"),
        ];
        for (d, expected) in cases {
            assert_eq!(format_interval(d), expected);
        }
    }
}
