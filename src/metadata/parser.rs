/// Utility functions for normalising raw tag values

use regex::Regex;
use std::sync::OnceLock;

/// Get the regex pattern matching the leading number of a tag value
fn get_leading_number_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // Match the digits before an optional "/total" or any trailing text,
        // e.g. "3/12", "07", "2016-04-01"
        Regex::new(r"^\s*(\d+)").unwrap()
    })
}

/// Parse the leading integer of a numeric tag such as a track number
///
/// # Examples
/// ```
/// use trackdeck_lib::metadata::parser::parse_leading_number;
///
/// assert_eq!(parse_leading_number("3/12"), Some(3));
/// assert_eq!(parse_leading_number("2016-04-01"), Some(2016));
/// assert_eq!(parse_leading_number("unknown"), None);
/// ```
pub fn parse_leading_number(value: &str) -> Option<i64> {
    get_leading_number_regex()
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Trim a tag value, dropping it entirely when nothing is left
pub fn non_empty<S: AsRef<str>>(value: Option<S>) -> Option<String> {
    value
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
}
