//! Display helpers shared by list and detail pages.

use chrono::{DateTime, Datelike, NaiveDate};

/// Uppercase the first character, leaving the rest untouched.
///
/// ```
/// assert_eq!(tojumi_core::format::capitalize_first("lagos"), "Lagos");
/// ```
#[must_use]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Turn an amenity key such as `WHEELCHAIR_ACCESS` or `free-wifi` into
/// `Wheelchair Access` / `Free Wifi`.
#[must_use]
pub fn format_amenity(raw: &str) -> String {
    raw.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| capitalize_first(&word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a date of birth as sent by the API: RFC 3339, a bare `YYYY-MM-DD`
/// or a millisecond timestamp string.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Some(date) = raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) {
        return Some(date);
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.date_naive())
}

/// Whole years between `dob` and `today`, `None` for unparseable or future dates.
#[must_use]
pub fn age_on(dob: &str, today: NaiveDate) -> Option<u32> {
    let born = parse_date(dob)?;
    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Age today from a date of birth.
#[must_use]
pub fn age_from_dob(dob: &str) -> Option<u32> {
    age_on(dob, chrono::Utc::now().date_naive())
}

/// `15 Mar 2024` for a date the API sent in any supported form.
#[must_use]
pub fn display_date(raw: &str) -> String {
    parse_date(raw).map_or_else(|| raw.to_owned(), |d| d.format("%-d %b %Y").to_string())
}
