//! Utility functions for markpress

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

/// Time zone used for displayed dates when none is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Shanghai;

/// Characters read per minute in the reading time estimate.
const READING_CHARS_PER_MINUTE: usize = 400;

/// Escapes HTML special characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Estimates reading time of article text in whole minutes
///
/// Counts characters rather than words so CJK prose, which has no word
/// separators, gets a sensible estimate. Empty text reads in zero minutes.
pub fn estimate_reading_time(text: &str) -> usize {
    text.chars().count().div_ceil(READING_CHARS_PER_MINUTE)
}

/// Parses a timestamp as stored by the blog backend
///
/// Accepts RFC 3339 values (converted into `tz`), naive
/// `YYYY-MM-DD HH:MM:SS` values with either a space or `T` separator and
/// optional fractional seconds (taken as already local), and bare
/// `YYYY-MM-DD` dates (midnight).
///
/// # Returns
///
/// Local date time, or `None` when the value is not a recognized timestamp
pub fn parse_date_time(value: &str, tz: Tz) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Some(aware.with_timezone(&tz).naive_local());
    }

    let normalized = value.replacen(' ', "T", 1);
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Formats a backend timestamp as a `YYYY/MM/DD` date
///
/// Values that cannot be parsed are returned unchanged so the page still
/// shows something meaningful.
pub fn format_date(value: &str) -> String {
    match parse_date_time(value, DEFAULT_TIMEZONE) {
        Some(date_time) => date_time.format("%Y/%m/%d").to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_all_characters() {
        // Arrange
        let input = r#"<>&"'"#;

        // Act
        let output = escape_html(input);

        // Assert
        assert_eq!(output, "&lt;&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(estimate_reading_time(""), 0);
        assert_eq!(estimate_reading_time("a"), 1);
        assert_eq!(estimate_reading_time(&"x".repeat(400)), 1);
        assert_eq!(estimate_reading_time(&"x".repeat(401)), 2);
    }

    #[test]
    fn test_reading_time_counts_chars_not_bytes() {
        // Arrange: 400 CJK characters are 1200 bytes
        let text = "字".repeat(400);

        // Act
        let minutes = estimate_reading_time(&text);

        // Assert
        assert_eq!(minutes, 1);
    }

    #[test]
    fn test_parse_rfc3339_converts_zone() {
        // Arrange
        let value = "2024-03-01T20:30:00Z";

        // Act
        let parsed = parse_date_time(value, DEFAULT_TIMEZONE).expect("Should parse RFC 3339");

        // Assert
        assert_eq!(parsed.to_string(), "2024-03-02 04:30:00");
    }

    #[test]
    fn test_parse_space_separated() {
        // Act
        let parsed =
            parse_date_time("2024-03-01 08:15:00", DEFAULT_TIMEZONE).expect("Should parse");

        // Assert
        assert_eq!(parsed.to_string(), "2024-03-01 08:15:00");
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let parsed = parse_date_time("2024-03-01T08:15:00.123456", DEFAULT_TIMEZONE);
        assert!(parsed.is_some());
    }

    #[test]
    fn test_parse_bare_date() {
        let parsed = parse_date_time("2024-03-01", DEFAULT_TIMEZONE).expect("Should parse");
        assert_eq!(parsed.to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date_time("yesterday", DEFAULT_TIMEZONE).is_none());
        assert!(parse_date_time("", DEFAULT_TIMEZONE).is_none());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-01-05 10:00:00"), "2024/01/05");
        assert_eq!(format_date("2024-01-05T23:00:00+00:00"), "2024/01/06");
    }

    #[test]
    fn test_format_date_passthrough() {
        assert_eq!(format_date("not a date"), "not a date");
    }
}
