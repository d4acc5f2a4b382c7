//! Resource URL extraction from page HTML.
//!
//! Collects `<script src>` values and resource-hint `<link href>` values so
//! that `script_url`, `asset_host` and `api_host` matchers have something to
//! inspect. Relative URLs are resolved against the page URL.

use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::config::RESOURCE_HINT_RELS;

const SCRIPT_SRC_SELECTOR_STR: &str = "script[src]";
const LINK_HINT_SELECTOR_STR: &str = "link[rel][href]";

static SCRIPT_SRC_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback(SCRIPT_SRC_SELECTOR_STR, "script src extraction"));

static LINK_HINT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback(LINK_HINT_SELECTOR_STR, "resource hint extraction"));

/// Parses a CSS selector, falling back to one that matches nothing.
fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        log::error!(
            "Failed to parse CSS selector '{}' in {}: {}. Using fallback selector.",
            selector_str,
            context,
            e
        );
        Selector::parse("*:not(*)").expect(
            "Fallback selector '*:not(*)' should always parse - this is a programming error",
        )
    })
}

/// Extracts script sources and resource hints from `html`.
///
/// Order of first appearance is preserved; duplicates (after resolution) are dropped.
pub(crate) fn extract_resource_urls(html: &str, base: Option<&Url>) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    let mut push = |raw: &str| {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }
        let resolved = resolve(raw, base);
        if seen.insert(resolved.clone()) {
            urls.push(resolved);
        }
    };

    for element in document.select(&SCRIPT_SRC_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            push(src);
        }
    }

    for element in document.select(&LINK_HINT_SELECTOR) {
        let is_hint = element
            .value()
            .attr("rel")
            .map(|rel| {
                rel.split_ascii_whitespace()
                    .any(|r| RESOURCE_HINT_RELS.contains(&r.to_ascii_lowercase().as_str()))
            })
            .unwrap_or(false);
        if !is_hint {
            continue;
        }
        if let Some(href) = element.value().attr("href") {
            push(href);
        }
    }

    log::trace!("Extracted {} resource URL(s) from page", urls.len());
    urls
}

fn resolve(raw: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => base
            .join(raw)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| raw.to_string()),
        None => raw.to_string(),
    }
}
