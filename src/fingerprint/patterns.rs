//! Pattern compilation and URL helpers for matcher evaluation.
//!
//! All signature regexes are compiled case-insensitively. Name selectors for
//! headers and cookies are anchored so a plain name selects exactly that key
//! while an alternation selects any of its spellings.

use regex::{Regex, RegexBuilder};
use url::Url;

use crate::config::MAX_PATTERN_LOG_CHARS;

/// Compiles a matcher pattern (unanchored search, case-insensitive).
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Compiles a header/cookie name selector as a whole-name match.
///
/// `X-A|X-B` becomes `^(?:X-A|X-B)$`, so it matches `x-b` but not `x-bb`.
pub(crate) fn compile_name_selector(selector: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!("^(?:{})$", selector))
        .case_insensitive(true)
        .build()
}

/// Extracts the host component of a resource URL.
///
/// Returns `None` for relative or unparsable URLs. Protocol-relative URLs
/// (`//cdn.example.com/x.js`) are read as https.
pub(crate) fn host_of(resource_url: &str) -> Option<String> {
    let trimmed = resource_url.trim();
    let parsed = if trimmed.starts_with("//") {
        Url::parse(&format!("https:{}", trimmed))
    } else {
        Url::parse(trimmed)
    };
    parsed
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Shortens a pattern for log output.
pub(crate) fn truncate_for_log(pattern: &str) -> String {
    if pattern.chars().count() <= MAX_PATTERN_LOG_CHARS {
        pattern.to_string()
    } else {
        let head: String = pattern.chars().take(MAX_PATTERN_LOG_CHARS).collect();
        format!("{}…", head)
    }
}
