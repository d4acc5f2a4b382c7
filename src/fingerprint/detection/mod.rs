//! Vendor detection engine.
//!
//! This module evaluates every vendor of a signature catalog against a page
//! snapshot and groups the vendors that clear their threshold by category.
//! Detection is synchronous, performs no I/O and is deterministic for a given
//! `(catalog, context)` pair.

mod matching;
mod scoring;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fingerprint::context::MatchContext;
use crate::fingerprint::models::{MatcherKind, SignatureCatalog};

use scoring::score_vendor;

/// Detection outcome for one vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Normalized confidence in `[0, 1]`, two decimals
    pub confidence: f64,
    /// Matched evidence per matcher kind; kinds without matches are absent
    pub evidence: BTreeMap<MatcherKind, Vec<String>>,
}

/// Detected vendors: category → vendor name → result.
pub type Detections = BTreeMap<String, BTreeMap<String, DetectionResult>>;

/// Detects vendors present in `ctx`.
///
/// Categories and vendors with no detection are absent from the result; an
/// empty map is a valid outcome.
pub fn detect(catalog: &SignatureCatalog, ctx: &MatchContext) -> Detections {
    let mut detections = Detections::new();

    for vendor in &catalog.vendors {
        if let Some(result) = score_vendor(vendor, ctx, catalog) {
            log::debug!(
                "Detected {} ({}) with confidence {:.2}",
                vendor.name,
                vendor.category,
                result.confidence
            );
            detections
                .entry(vendor.category.clone())
                .or_default()
                .insert(vendor.name.clone(), result);
        }
    }

    log::debug!(
        "Detection for {} matched {} vendor(s) in {} category(ies)",
        ctx.url,
        detections.values().map(BTreeMap::len).sum::<usize>(),
        detections.len()
    );

    detections
}
