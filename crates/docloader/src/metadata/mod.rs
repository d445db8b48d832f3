//! Best-effort metadata heuristics shared by the format parsers.
//!
//! None of these functions fail: when a source offers nothing usable they
//! return empty [Properties](crate::Properties).

pub mod content;
pub mod filename;
pub mod html;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub use content::{ContentHeuristic, extract_content_metadata, heading_title};
pub use filename::extract_filename_metadata;
pub use html::{extract_html_metadata, generate_content_abstract, strip_html_tags};

/// The first `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Trimmed, non-empty pieces of a keyword list split on any of `separators`.
pub(crate) fn split_keywords(raw: &str, separators: &[char]) -> Vec<String> {
    raw.split(separators)
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Leading four-digit year of a date string such as `2021-06-30`.
pub(crate) fn year_prefix(date: &str) -> String {
    let date = date.trim();
    match date.get(..4) {
        Some(year) if year.chars().all(|c| c.is_ascii_digit()) => year.to_string(),
        _ => String::new(),
    }
}

/// Unix seconds of an RFC 3339 timestamp or a bare `YYYY-MM-DD` date, 0 when unparsable.
pub(crate) fn parse_timestamp(date: &str) -> i64 {
    let date = date.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return parsed.timestamp();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S") {
        return parsed.and_utc().timestamp();
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or(0, |midnight| midnight.and_utc().timestamp())
}
