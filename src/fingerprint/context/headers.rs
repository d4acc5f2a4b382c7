//! Header and cookie parsing utilities for building a match context.
//!
//! Header and cookie names are normalized to lowercase; values are kept as
//! received since all matching is case-insensitive anyway.

/// Splits a raw `Name: value` header line.
pub(crate) fn parse_header_line(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_lowercase(), value.trim().to_string()))
}

/// Extracts the cookie carried by a `Set-Cookie` header value.
///
/// Only the leading `name=value` pair counts; attributes such as `Path` are ignored.
pub(crate) fn parse_set_cookie(header_value: &str) -> Option<(String, String)> {
    header_value.split(';').next().and_then(parse_cookie_pair)
}

/// Extracts every cookie from a request `Cookie` header value (`a=1; b=2`).
pub(crate) fn parse_cookie_header(header_value: &str) -> Vec<(String, String)> {
    header_value
        .split(';')
        .filter_map(parse_cookie_pair)
        .collect()
}

/// Parses a single `name=value` pair.
pub(crate) fn parse_cookie_pair(pair: &str) -> Option<(String, String)> {
    let mut parts = pair.trim().splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(name), Some(value)) if !name.trim().is_empty() => Some((
            name.trim().to_lowercase(),
            value.trim().trim_matches('"').to_string(),
        )),
        _ => None,
    }
}
