//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;
use tojumi_core::Naira;
use tojumi_core::format::{capitalize_first, display_date};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Format an amount as Naira, e.g. `₦1,234.50`.
///
/// Values that are not numbers are shown unchanged.
#[askama::filter_fn]
pub fn naira(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(raw
        .trim()
        .parse::<Decimal>()
        .map_or(raw, |amount| Naira::new(amount).to_string()))
}

/// Human-readable date (`12 Mar 2024`) from an API date string.
#[askama::filter_fn]
pub fn date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(display_date(&value.to_string()))
}

/// Upper-case the first character.
#[askama::filter_fn]
pub fn capitalize(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(capitalize_first(&value.to_string()))
}
