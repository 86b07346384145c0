// HTTP byte range parsing for the stream endpoint
use regex::Regex;
use std::sync::OnceLock;

/// Get the regex pattern for a single `bytes=` range
fn get_range_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\s*bytes\s*=\s*(\d*)\s*-\s*(\d*)\s*$").unwrap())
}

/// A requested byte range, before it is checked against the file length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=start-` or `bytes=start-end` (end inclusive)
    FromStart { start: u64, end: Option<u64> },
    /// `bytes=-n`, the last n bytes
    Suffix(u64),
}

impl ByteRange {
    /// Parse a `Range` header value. Only a single byte range is supported;
    /// anything else yields `None` and the whole file is served.
    pub fn parse(header: &str) -> Option<Self> {
        let caps = get_range_regex().captures(header)?;
        let start = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let end = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        match (start.is_empty(), end.is_empty()) {
            (true, true) => None,
            (true, false) => end.parse().ok().map(ByteRange::Suffix),
            (false, _) => {
                let start = start.parse().ok()?;
                let end = if end.is_empty() {
                    None
                } else {
                    Some(end.parse().ok()?)
                };
                if matches!(end, Some(end) if end < start) {
                    return None;
                }
                Some(ByteRange::FromStart { start, end })
            }
        }
    }

    /// Inclusive `(first, last)` byte offsets within a body of `length`
    /// bytes, or `None` when the range cannot be satisfied
    pub fn resolve(&self, length: u64) -> Option<(u64, u64)> {
        if length == 0 {
            return None;
        }

        match *self {
            ByteRange::FromStart { start, end } => {
                if start >= length {
                    return None;
                }
                let last = end.map_or(length - 1, |end| end.min(length - 1));
                Some((start, last))
            }
            ByteRange::Suffix(0) => None,
            ByteRange::Suffix(n) => Some((length.saturating_sub(n), length - 1)),
        }
    }
}
