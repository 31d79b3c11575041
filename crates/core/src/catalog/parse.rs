//! Defensive parsing of the provider's free-text fields.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Runtime reported when the provider's value is not `"<int> min"`.
pub const DEFAULT_RUNTIME_MINUTES: u32 = 50;

/// Placeholder the provider uses for absent values.
pub const NOT_AVAILABLE: &str = "N/A";

static RUNTIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*min\s*$").expect("runtime regex is valid"));

/// Parse a rating string like `"7.6"` or `"7.6/10"` into a rounded integer.
///
/// `None`, `"N/A"` and anything unparsable yield 0.
pub fn parse_rating(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim) else {
        return 0;
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return 0;
    }

    let leading = raw.split('/').next().unwrap_or_default().trim();
    match leading.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.round() as u32,
        _ => 0,
    }
}

/// Parse a runtime string like `"142 min"`.
pub fn parse_runtime(raw: &str) -> u32 {
    RUNTIME_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_RUNTIME_MINUTES)
}

/// Split the provider's comma-joined genre string.
pub fn split_genres(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case(NOT_AVAILABLE))
        .map(String::from)
        .collect()
}

/// Map the provider's `N/A` and empty strings to `None`.
pub fn non_placeholder(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(NOT_AVAILABLE))
}
