//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Build-time content hash of a static asset, `"css"` or `"js"`.
///
/// Usage in templates: `/static/derived/main.{{ "css"|asset_hash }}.css`
#[askama::filter_fn]
pub fn asset_hash(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(match value.to_string().as_str() {
        "js" => env!("JS_HASH"),
        _ => env!("CSS_HASH"),
    })
}

/// Pluralized day count, e.g. `1 day` or `3 days`.
///
/// Usage in templates: `{{ line.days|days }}`
#[askama::filter_fn]
pub fn days(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let value = value.to_string();
    Ok(if value == "1" {
        "1 day".to_string()
    } else {
        format!("{value} days")
    })
}
