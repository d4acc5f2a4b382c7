//! Tests for catalog loading, layout normalization and the reloadable store.

mod helpers;

use std::path::PathBuf;
use std::sync::Arc;

use helpers::{segment_full_page, yaml_catalog, FINGERPRINTS_YAML};
use stack_fingerprint::fingerprint::ScoringMode;
use stack_fingerprint::{
    detect, load_catalog, parse_catalog, CatalogLoadError, CatalogStore, DocumentFormat,
    MatchContext,
};
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fingerprints.yaml")
}

#[tokio::test]
async fn test_load_fixture_from_disk() {
    let catalog = load_catalog(&fixture_path())
        .await
        .expect("Failed to load fixture catalog");
    assert_eq!(catalog.vendors.len(), 5);
    assert_eq!(catalog.scoring_mode, ScoringMode::Coverage);
    assert_eq!(catalog.metadata.schema_version.as_deref(), Some("2024.06"));
    assert_eq!(catalog.defective_matcher_count(), 0);
}

#[test]
fn test_default_threshold_top_level_and_nested_agree() {
    let top_level = yaml_catalog(
        r#"
default_threshold: 0.5
core:
  - name: Heap
    matchers:
      - type: html
        pattern: heap\.load\(
        weight: 0.5
"#,
    );
    let nested = yaml_catalog(
        r#"
scoring:
  default_threshold: 0.5
core:
  - name: Heap
    matchers:
      - type: html
        pattern: heap\.load\(
        weight: 0.5
"#,
    );

    for catalog in [&top_level, &nested] {
        let heap = catalog.vendor("Heap").expect("Heap should be loaded");
        assert_eq!(catalog.effective_threshold(heap), 0.5);
    }

    let page = MatchContext::builder("https://example.com/")
        .html("<script>heap.load('123');</script>")
        .build();
    assert_eq!(detect(&top_level, &page), detect(&nested, &page));
    assert_eq!(detect(&top_level, &page)["core"]["Heap"].confidence, 1.0);
}

#[test]
fn test_flat_and_explicit_layouts_detect_identically() {
    let flat = yaml_catalog(
        r#"
core:
  - name: Segment
    matchers:
      - type: script_url
        pattern: cdn\.segment\.com
      - kind: cookie
        name: ajs_.*
"#,
    );
    let explicit = parse_catalog(
        r#"{"vendors": [{"name": "Segment", "category": "core", "matchers": [
            {"type": "script_url", "pattern": "cdn\\.segment\\.com"},
            {"kind": "cookie", "name": "ajs_.*"}
        ]}]}"#,
        DocumentFormat::Json,
        "inline.json",
    )
    .expect("Failed to parse explicit layout");

    let page = segment_full_page();
    assert_eq!(detect(&flat, &page), detect(&explicit, &page));
    assert!(!detect(&flat, &page).is_empty());
}

#[test]
fn test_yaml_and_json_fixture_agree() {
    let from_yaml = parse_catalog(FINGERPRINTS_YAML, DocumentFormat::Yaml, "fixture.yaml")
        .expect("Failed to parse YAML");
    let as_json: serde_json::Value =
        serde_yaml::from_str(FINGERPRINTS_YAML).expect("Failed to read YAML");
    let from_json = parse_catalog(&as_json.to_string(), DocumentFormat::Json, "fixture.json")
        .expect("Failed to parse JSON");

    let page = segment_full_page();
    assert_eq!(detect(&from_yaml, &page), detect(&from_json, &page));
}

#[test]
fn test_load_errors_are_typed() {
    let cases: [(&str, fn(&CatalogLoadError) -> bool); 4] = [
        ("- just\n- a list\n", |e| {
            matches!(e, CatalogLoadError::InvalidStructure(_))
        }),
        ("default_threshold: -1\n", |e| {
            matches!(e, CatalogLoadError::InvalidThreshold { .. })
        }),
        ("a: [{name: X}]\nb: [{name: X}]\n", |e| {
            matches!(e, CatalogLoadError::DuplicateVendor(_))
        }),
        ("core: [\n", |e| matches!(e, CatalogLoadError::Parse { .. })),
    ];

    for (yaml, expected) in cases {
        let err = parse_catalog(yaml, DocumentFormat::Yaml, "case.yaml")
            .err()
            .unwrap_or_else(|| panic!("Expected {:?} to fail", yaml));
        assert!(expected(&err), "Unexpected error for {:?}: {}", yaml, err);
    }
}

#[tokio::test]
async fn test_store_reload_does_not_disturb_in_flight_snapshot() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("fingerprints.yaml");
    tokio::fs::write(&path, FINGERPRINTS_YAML)
        .await
        .expect("Failed to write catalog");

    let store = Arc::new(CatalogStore::new().with_source("martech", &path));
    let snapshot = store.load("martech").await.expect("Failed to load");

    // Drop Segment from the document and publish it
    let trimmed = FINGERPRINTS_YAML.replacen("  - name: Segment", "  - name: Segment Legacy", 1);
    tokio::fs::write(&path, trimmed)
        .await
        .expect("Failed to rewrite catalog");

    let reloader = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.reload("martech").await })
    };

    let page = segment_full_page();
    let before = detect(&snapshot, &page);
    reloader
        .await
        .expect("reload task panicked")
        .expect("reload should succeed");

    assert!(before["core"].contains_key("Segment"));
    // The snapshot taken before the reload is untouched
    assert!(detect(&snapshot, &page)["core"].contains_key("Segment"));

    let current = store.get("martech").await.expect("catalog should be published");
    let after = detect(&current, &page);
    assert!(after["core"].contains_key("Segment Legacy"));
    assert!(!after["core"].contains_key("Segment"));
}

#[tokio::test]
async fn test_store_reload_all_keeps_good_catalogs() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let good = dir.path().join("good.yaml");
    let bad = dir.path().join("bad.json");
    tokio::fs::write(&good, FINGERPRINTS_YAML)
        .await
        .expect("Failed to write catalog");
    tokio::fs::write(&bad, "{\"vendors\": 3}")
        .await
        .expect("Failed to write catalog");

    let store = CatalogStore::new()
        .with_source("good", &good)
        .with_source("bad", &bad);
    let failures = store.reload_all().await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "bad");
    assert!(matches!(failures[0].1, CatalogLoadError::InvalidStructure(_)));
    assert!(store.get("good").await.is_some());
    assert!(store.get("bad").await.is_none());
}
