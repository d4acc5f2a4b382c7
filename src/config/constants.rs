//! Configuration constants.
//!
//! This module defines the defaults used when a signature document leaves a
//! value unspecified, plus the fixed vocabulary of the document format.

/// Threshold used when a document declares neither `default_threshold` nor
/// `scoring.default_threshold`.
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Weight of a matcher when neither the matcher nor the `scoring` table
/// provides one.
pub const DEFAULT_MATCHER_WEIGHT: f64 = 1.0;

/// Category bucket for vendors that do not declare one.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Label recorded as the catalog source when parsing from an in-memory string.
pub const INLINE_SOURCE: &str = "<inline>";

/// Informational document version.
pub const KEY_SCHEMA_VERSION: &str = "schema_version";
/// Weight table keyed by matcher kind.
pub const KEY_SCORING: &str = "scoring";
/// Catalog-wide threshold, top level or inside `scoring`.
pub const KEY_DEFAULT_THRESHOLD: &str = "default_threshold";
/// Vendor list of the explicit layout.
pub const KEY_VENDORS: &str = "vendors";
/// Confidence normalization, inside `scoring`.
pub const KEY_SCORING_MODE: &str = "mode";

/// Top-level keys that are never interpreted as category names in the flat layout.
pub const RESERVED_DOCUMENT_KEYS: &[&str] =
    &[KEY_SCHEMA_VERSION, KEY_SCORING, KEY_DEFAULT_THRESHOLD];

/// `<link rel>` values treated as resource hints when collecting resource URLs.
pub const RESOURCE_HINT_RELS: &[&str] = &[
    "preload",
    "prefetch",
    "preconnect",
    "dns-prefetch",
    "modulepreload",
];

/// Tolerance when comparing an accumulated score against a threshold.
///
/// Sums of fractional weights (0.7 + 0.1) land a few ULPs below the exact value.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Maximum number of characters of a matcher pattern echoed in log lines.
pub const MAX_PATTERN_LOG_CHARS: usize = 120;
