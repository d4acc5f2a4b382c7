// Shared test helpers for catalog fixtures and page snapshots.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use stack_fingerprint::{parse_catalog, DocumentFormat, MatchContext, SignatureCatalog};

/// Signature catalog used by the scenario tests (coverage scoring).
#[allow(dead_code)] // Used by other test files
pub const FINGERPRINTS_YAML: &str = include_str!("fixtures/fingerprints.yaml");

/// Parses the shared fixture catalog.
#[allow(dead_code)] // Used by other test files
pub fn fixture_catalog() -> SignatureCatalog {
    parse_catalog(FINGERPRINTS_YAML, DocumentFormat::Yaml, "fixtures/fingerprints.yaml")
        .expect("Failed to parse fixture catalog")
}

/// Parses an inline YAML catalog.
#[allow(dead_code)] // Used by other test files
pub fn yaml_catalog(yaml: &str) -> SignatureCatalog {
    parse_catalog(yaml, DocumentFormat::Yaml, "inline.yaml").expect("Failed to parse catalog")
}

/// Page carrying every Segment signal: script tag, inline call and both cookies.
#[allow(dead_code)] // Used by other test files
pub fn segment_full_page() -> MatchContext {
    MatchContext::builder("https://shop.example.com/")
        .html(
            "<script src='https://cdn.segment.com/analytics.js'></script>\
             <script>analytics.load('XYZ');</script>",
        )
        .header("Set-Cookie", "ajs_anonymous_id=abc; Path=/")
        .header("Set-Cookie", "ajs_user_id=123; Path=/")
        .extract_resources(true)
        .build()
}
