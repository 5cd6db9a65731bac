//! Parsing of the free-form timestamp and duration text found in CSV exports.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Format tried after every configured one (`M/dd/yyyy h:mm`).
pub const FALLBACK_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Parse a timestamp written in one of the supported forms.
///
/// Tried in order: RFC 3339, unix seconds, each of `formats` as a naive UTC
/// time, and finally [`FALLBACK_TIMESTAMP_FORMAT`].
///
/// ```rust
/// use scrobble_import::parsing::parse_timestamp;
///
/// let ts = parse_timestamp("1/05/2023 7:30", &[] as &[&str]).unwrap();
/// assert_eq!(ts.to_rfc3339(), "2023-01-05T07:30:00+00:00");
/// ```
pub fn parse_timestamp<S: AsRef<str>>(text: &str, formats: &[S]) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
    }

    formats
        .iter()
        .map(|format| format.as_ref())
        .chain(std::iter::once(FALLBACK_TIMESTAMP_FORMAT))
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn duration_regex() -> &'static Regex {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    DURATION.get_or_init(|| {
        Regex::new(r"^(?:(\d+):)?(\d+):([0-5]\d)$").expect("duration pattern is valid")
    })
}

/// Parse a track length written as seconds, `m:ss` or `h:mm:ss`.
///
/// Returns `None` for text in any other shape.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let captures = duration_regex().captures(text)?;
    let hours: u64 = captures
        .get(1)
        .map_or(Some(0), |m| m.as_str().parse().ok())?;
    let minutes: u64 = captures[2].parse().ok()?;
    let seconds: u64 = captures[3].parse().ok()?;

    Some(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}
