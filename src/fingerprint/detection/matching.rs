//! Matcher evaluation.
//!
//! This module decides whether a single matcher definition matches a page
//! snapshot and, if so, what evidence to record. Evaluation is a pure
//! function of the matcher and the context.

use regex::Regex;
use std::collections::BTreeMap;

use crate::fingerprint::context::MatchContext;
use crate::fingerprint::models::{MatcherDefinition, MatcherKind};
use crate::fingerprint::patterns::host_of;

/// Evaluates one matcher against a context.
///
/// Returns the evidence value on a match:
/// - the matcher's pattern text for body, URL and resource kinds
/// - the concrete (lowercased) header or cookie name for `response_header`/`cookie`
///
/// Defective matchers never match.
pub(crate) fn evaluate(matcher: &MatcherDefinition, ctx: &MatchContext) -> Option<String> {
    if !matcher.is_usable() {
        return None;
    }

    match matcher.kind {
        MatcherKind::Html | MatcherKind::ResponseBody => {
            search(matcher, &ctx.html).then(|| pattern_evidence(matcher))
        }
        MatcherKind::Path => search(matcher, &ctx.path).then(|| pattern_evidence(matcher)),
        MatcherKind::Hostname => {
            search(matcher, &ctx.hostname).then(|| pattern_evidence(matcher))
        }
        MatcherKind::Url => search(matcher, &ctx.url).then(|| pattern_evidence(matcher)),
        MatcherKind::ScriptUrl => ctx
            .resource_urls
            .iter()
            .any(|u| search(matcher, u))
            .then(|| pattern_evidence(matcher)),
        MatcherKind::AssetHost | MatcherKind::ApiHost => ctx
            .resource_urls
            .iter()
            .filter_map(|u| host_of(u))
            .any(|host| search(matcher, &host))
            .then(|| pattern_evidence(matcher)),
        MatcherKind::ResponseHeader => match_named_entry(matcher, &ctx.headers, false),
        MatcherKind::Cookie => match_named_entry(matcher, &ctx.cookies, true),
    }
}

fn search(matcher: &MatcherDefinition, text: &str) -> bool {
    matcher
        .pattern_regex()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn pattern_evidence(matcher: &MatcherDefinition) -> String {
    matcher.pattern.clone().unwrap_or_default()
}

/// Finds the first entry whose name matches the selector and whose value
/// satisfies the pattern (or, without a pattern, is present).
///
/// Cookies additionally need a non-empty value when no pattern is given.
fn match_named_entry(
    matcher: &MatcherDefinition,
    entries: &BTreeMap<String, String>,
    require_value: bool,
) -> Option<String> {
    let selector: &Regex = matcher.name_regex()?;
    let value_pattern = matcher.pattern_regex();

    entries
        .iter()
        .filter(|(name, _)| selector.is_match(name))
        .find(|(_, value)| match value_pattern {
            Some(re) => re.is_match(value),
            None => !require_value || !value.is_empty(),
        })
        .map(|(name, _)| name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(kind: MatcherKind, pattern: Option<&str>, name: Option<&str>) -> MatcherDefinition {
        MatcherDefinition::new(
            kind,
            pattern.map(str::to_string),
            name.map(str::to_string),
            None,
        )
    }

    fn segment_context() -> MatchContext {
        MatchContext::builder("https://shop.example.com/checkout/cart")
            .html("<script>analytics.load('XYZ');</script>")
            .header("X-Powered-By", "Next.js")
            .header("Server", "")
            .cookie("ajs_anonymous_id", "abc")
            .cookie("ajs_user_id", "")
            .resource_url("https://cdn.segment.com/analytics.js/v1/XYZ/analytics.min.js")
            .resource_url("/relative/script.js")
            .build()
    }

    #[test]
    fn test_html_and_response_body_search_body_case_insensitively() {
        let ctx = segment_context();
        for kind in [MatcherKind::Html, MatcherKind::ResponseBody] {
            let m = matcher(kind, Some(r"ANALYTICS\.load"), None);
            assert_eq!(evaluate(&m, &ctx), Some(r"ANALYTICS\.load".to_string()));
        }
        let miss = matcher(MatcherKind::Html, Some(r"gtag\("), None);
        assert_eq!(evaluate(&miss, &ctx), None);
    }

    #[test]
    fn test_url_components() {
        let ctx = segment_context();
        assert!(evaluate(&matcher(MatcherKind::Path, Some("^/checkout"), None), &ctx).is_some());
        assert!(evaluate(&matcher(MatcherKind::Path, Some("^/shop"), None), &ctx).is_none());
        assert!(evaluate(&matcher(MatcherKind::Hostname, Some(r"^shop\."), None), &ctx).is_some());
        assert!(evaluate(&matcher(MatcherKind::Url, Some(r"^https://shop"), None), &ctx).is_some());
        assert!(evaluate(&matcher(MatcherKind::Hostname, Some("checkout"), None), &ctx).is_none());
    }

    #[test]
    fn test_script_url_matches_full_resource_url() {
        let ctx = segment_context();
        let m = matcher(MatcherKind::ScriptUrl, Some(r"analytics\.min\.js"), None);
        assert_eq!(evaluate(&m, &ctx), Some(r"analytics\.min\.js".to_string()));
    }

    #[test]
    fn test_asset_and_api_host_match_host_only() {
        let ctx = segment_context();
        for kind in [MatcherKind::AssetHost, MatcherKind::ApiHost] {
            let host = matcher(kind, Some(r"^cdn\.segment\.com$"), None);
            assert!(evaluate(&host, &ctx).is_some());
            // Path text is not part of the host
            let path = matcher(kind, Some("analytics"), None);
            assert!(evaluate(&path, &ctx).is_none());
        }
    }

    #[test]
    fn test_header_name_selector_is_regex_over_names() {
        let ctx = MatchContext::builder("https://example.com/")
            .header("X-B", "anything")
            .build();
        let m = matcher(MatcherKind::ResponseHeader, None, Some("X-A|X-B"));
        assert_eq!(evaluate(&m, &ctx), Some("x-b".to_string()));
    }

    #[test]
    fn test_header_presence_ignores_empty_value() {
        let ctx = segment_context();
        let m = matcher(MatcherKind::ResponseHeader, None, Some("server"));
        assert_eq!(evaluate(&m, &ctx), Some("server".to_string()));
    }

    #[test]
    fn test_header_pattern_must_match_value() {
        let ctx = segment_context();
        let hit = matcher(MatcherKind::ResponseHeader, Some("next\\.js"), Some("x-powered-by"));
        assert_eq!(evaluate(&hit, &ctx), Some("x-powered-by".to_string()));
        let miss = matcher(MatcherKind::ResponseHeader, Some("express"), Some("x-powered-by"));
        assert_eq!(evaluate(&miss, &ctx), None);
    }

    #[test]
    fn test_header_pattern_checked_per_selected_header() {
        let ctx = MatchContext::builder("https://example.com/")
            .header("X-Generator", "Hugo")
            .header("X-Powered-By", "WordPress")
            .build();
        let m = matcher(
            MatcherKind::ResponseHeader,
            Some("wordpress"),
            Some("x-generator|x-powered-by"),
        );
        assert_eq!(evaluate(&m, &ctx), Some("x-powered-by".to_string()));
    }

    #[test]
    fn test_cookie_presence_requires_non_empty_value() {
        let ctx = segment_context();
        let present = matcher(MatcherKind::Cookie, None, Some("ajs_anonymous_id"));
        assert_eq!(evaluate(&present, &ctx), Some("ajs_anonymous_id".to_string()));
        let empty = matcher(MatcherKind::Cookie, None, Some("ajs_user_id"));
        assert_eq!(evaluate(&empty, &ctx), None);
    }

    #[test]
    fn test_cookie_family_reports_first_concrete_name() {
        let ctx = segment_context();
        let m = matcher(MatcherKind::Cookie, None, Some("ajs_.*"));
        assert_eq!(evaluate(&m, &ctx), Some("ajs_anonymous_id".to_string()));
        let valued = matcher(MatcherKind::Cookie, Some("^abc$"), Some("ajs_.*"));
        assert_eq!(evaluate(&valued, &ctx), Some("ajs_anonymous_id".to_string()));
    }

    #[test]
    fn test_empty_collections_never_match() {
        let ctx = MatchContext::default();
        for m in [
            matcher(MatcherKind::ResponseHeader, None, Some(".*")),
            matcher(MatcherKind::Cookie, None, Some(".*")),
            matcher(MatcherKind::ScriptUrl, Some(".*"), None),
            matcher(MatcherKind::AssetHost, Some(".*"), None),
        ] {
            assert_eq!(evaluate(&m, &ctx), None, "{:?} should not match", m.kind);
        }
    }

    #[test]
    fn test_defective_matcher_never_matches() {
        let ctx = segment_context();
        let bad = matcher(MatcherKind::Html, Some("(analytics"), None);
        assert!(!bad.is_usable());
        assert_eq!(evaluate(&bad, &ctx), None);
    }
}
