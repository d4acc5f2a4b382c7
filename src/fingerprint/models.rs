//! Data structures for signature catalogs.
//!
//! This module contains the core data structures used for vendor detection:
//! - `MatcherKind`: The closed set of page facets a matcher can inspect
//! - `MatcherDefinition`: A single weighted rule with its compiled regexes
//! - `VendorDefinition`: A named, categorized bundle of matchers
//! - `SignatureCatalog`: The immutable, normalized catalog shared across requests
//! - `CatalogMetadata`: Where a catalog came from and when it was loaded

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::SystemTime;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::config::{DEFAULT_MATCHER_WEIGHT, DEFAULT_THRESHOLD, INLINE_SOURCE};
use crate::fingerprint::patterns::{compile_name_selector, compile_pattern};

/// The facet of a page snapshot a matcher inspects.
///
/// Parsed once at load time from the `type` (or `kind`) field of a matcher.
/// Ordering follows declaration order and is used to order evidence output.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MatcherKind {
    /// Page body (with appended script bodies)
    Html,
    /// Path component of the page URL
    Path,
    /// Hostname of the page URL
    Hostname,
    /// Full page URL
    Url,
    /// Any discovered resource URL
    ScriptUrl,
    /// Response header, selected by a name regex
    ResponseHeader,
    /// Cookie, selected by a name regex
    Cookie,
    /// Same text as `Html`; kept distinct for signature authors
    ResponseBody,
    /// Host of any discovered resource URL
    AssetHost,
    /// Host of any discovered resource URL
    ApiHost,
}

impl MatcherKind {
    /// Whether this kind selects header/cookie entries by name.
    pub fn uses_name_selector(self) -> bool {
        matches!(self, MatcherKind::ResponseHeader | MatcherKind::Cookie)
    }

    /// Whether a matcher of this kind is meaningless without a `pattern`.
    pub fn requires_pattern(self) -> bool {
        !self.uses_name_selector()
    }
}

/// How a detected vendor's confidence is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScoringMode {
    /// `score / effective_threshold`, capped at 1.0
    #[default]
    Threshold,
    /// `score / sum of the vendor's usable matcher weights`, capped at 1.0
    Coverage,
}

/// A single weighted rule.
///
/// Regexes are compiled when the definition is created. A definition that
/// cannot be evaluated (bad regex, missing pattern/name, non-finite weight)
/// is kept with a recorded defect and never matches.
#[derive(Debug, Clone)]
pub struct MatcherDefinition {
    /// Facet of the page this matcher inspects
    pub kind: MatcherKind,
    /// Regex source matched against the facet (or the header/cookie value)
    pub pattern: Option<String>,
    /// Regex source selecting header/cookie names
    pub name: Option<String>,
    /// Explicit weight; falls back to the catalog's type weight
    pub weight: Option<f64>,
    pattern_regex: Option<Regex>,
    name_regex: Option<Regex>,
    defect: Option<String>,
}

impl MatcherDefinition {
    /// Creates a matcher definition and compiles its regexes.
    pub fn new(
        kind: MatcherKind,
        pattern: Option<String>,
        name: Option<String>,
        weight: Option<f64>,
    ) -> Self {
        // Empty strings behave like absent fields
        let pattern = pattern.filter(|p| !p.is_empty());
        let name = name.filter(|n| !n.is_empty());

        let mut defect = None;

        let pattern_regex = match pattern.as_deref().map(compile_pattern) {
            Some(Ok(re)) => Some(re),
            Some(Err(e)) => {
                defect = Some(format!("invalid pattern: {}", e));
                None
            }
            None => None,
        };

        let name_regex = if kind.uses_name_selector() {
            match name.as_deref().map(compile_name_selector) {
                Some(Ok(re)) => Some(re),
                Some(Err(e)) => {
                    defect.get_or_insert_with(|| format!("invalid name selector: {}", e));
                    None
                }
                None => {
                    defect.get_or_insert_with(|| "missing name selector".to_string());
                    None
                }
            }
        } else {
            None
        };

        if kind.requires_pattern() && pattern.is_none() {
            defect.get_or_insert_with(|| "missing pattern".to_string());
        }

        if let Some(w) = weight {
            if !w.is_finite() {
                defect.get_or_insert_with(|| format!("non-finite weight {}", w));
            }
        }

        Self {
            kind,
            pattern,
            name,
            weight,
            pattern_regex,
            name_regex,
            defect,
        }
    }

    /// Whether this matcher can ever match.
    pub fn is_usable(&self) -> bool {
        self.defect.is_none()
    }

    /// Why this matcher can never match, if it can't.
    pub fn defect(&self) -> Option<&str> {
        self.defect.as_deref()
    }

    pub(crate) fn pattern_regex(&self) -> Option<&Regex> {
        self.pattern_regex.as_ref()
    }

    pub(crate) fn name_regex(&self) -> Option<&Regex> {
        self.name_regex.as_ref()
    }
}

/// A named, categorized bundle of matchers.
#[derive(Debug, Clone)]
pub struct VendorDefinition {
    /// Unique vendor name, used as the output key
    pub name: String,
    /// Output category bucket
    pub category: String,
    /// Per-vendor threshold override
    pub threshold: Option<f64>,
    /// Matchers in document order
    pub matchers: Vec<MatcherDefinition>,
}

/// Catalog metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    /// Source path, or `<inline>` for in-memory documents
    pub source: String,
    /// Informational `schema_version` from the document
    pub schema_version: Option<String>,
    /// When the catalog was built
    pub loaded_at: SystemTime,
}

/// Normalized, immutable signature catalog.
///
/// Both document layouts are normalized into this shape at load time.
/// Share it as `Arc<SignatureCatalog>`; it is never mutated after load.
#[derive(Debug, Clone)]
pub struct SignatureCatalog {
    /// Threshold for vendors without an override
    pub default_threshold: f64,
    /// Default weight per matcher kind
    pub type_weights: HashMap<MatcherKind, f64>,
    /// Confidence normalization
    pub scoring_mode: ScoringMode,
    /// Vendors in document order
    pub vendors: Vec<VendorDefinition>,
    /// Where the catalog came from
    pub metadata: CatalogMetadata,
}

impl SignatureCatalog {
    /// A catalog with no vendors; `detect()` against it never reports anything.
    pub fn empty() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            type_weights: HashMap::new(),
            scoring_mode: ScoringMode::default(),
            vendors: Vec::new(),
            metadata: CatalogMetadata {
                source: INLINE_SOURCE.to_string(),
                schema_version: None,
                loaded_at: SystemTime::now(),
            },
        }
    }

    /// Weight contributed by `matcher` when it matches.
    pub fn weight_for(&self, matcher: &MatcherDefinition) -> f64 {
        matcher
            .weight
            .or_else(|| self.type_weights.get(&matcher.kind).copied())
            .unwrap_or(DEFAULT_MATCHER_WEIGHT)
    }

    /// Threshold a vendor's score must reach to be reported.
    pub fn effective_threshold(&self, vendor: &VendorDefinition) -> f64 {
        vendor.threshold.unwrap_or(self.default_threshold)
    }

    /// Looks up a vendor by name.
    pub fn vendor(&self, name: &str) -> Option<&VendorDefinition> {
        self.vendors.iter().find(|v| v.name == name)
    }

    /// Number of matchers that can never match.
    pub fn defective_matcher_count(&self) -> usize {
        self.vendors
            .iter()
            .flat_map(|v| v.matchers.iter())
            .filter(|m| !m.is_usable())
            .count()
    }
}
