//! Output shaping for detection results.
//!
//! The engine always produces full `Detections`. Callers that only want vendor
//! names per category collapse them here; `AnalyzeResponse` is the JSON
//! document the binary prints.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::fingerprint::{Detections, MatchContext, SignatureCatalog};

/// Vendor names per category, confidence and evidence dropped.
pub type CollapsedDetections = BTreeMap<String, Vec<String>>;

/// Drops confidence and evidence while keeping the category grouping.
///
/// Vendor names come out sorted within each category.
pub fn collapse(detections: &Detections) -> CollapsedDetections {
    detections
        .iter()
        .map(|(category, vendors)| (category.clone(), vendors.keys().cloned().collect()))
        .collect()
}

/// Detected vendors, either with full results or names only.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum VendorReport {
    /// Confidence and evidence per vendor
    Detailed(Detections),
    /// Vendor names per category
    Collapsed(CollapsedDetections),
}

/// Inputs the detection saw, for troubleshooting missed vendors.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    /// Resource URLs in the match context
    pub resources: Vec<String>,
    /// Length of the body text in bytes, script bodies included
    pub html_size: usize,
    /// Cookie names in the match context
    pub cookies: Vec<String>,
    /// Where the catalog was loaded from
    pub catalog_source: String,
}

/// Response for one analyzed page.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    /// Page URL
    pub url: String,
    /// Detected vendors
    pub vendors: VendorReport,
    /// True when the catalog failed to load and an empty one was used
    pub degraded: bool,
    /// Present only for debug responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl AnalyzeResponse {
    /// Builds the response; `debug` keeps full results and adds the debug section.
    pub fn new(
        ctx: &MatchContext,
        catalog: &SignatureCatalog,
        detections: Detections,
        debug: bool,
        degraded: bool,
    ) -> Self {
        let (vendors, debug) = if debug {
            let info = DebugInfo {
                resources: ctx.resource_urls.clone(),
                html_size: ctx.html.len(),
                cookies: ctx.cookies.keys().cloned().collect(),
                catalog_source: catalog.metadata.source.clone(),
            };
            (VendorReport::Detailed(detections), Some(info))
        } else {
            (VendorReport::Collapsed(collapse(&detections)), None)
        };

        Self {
            url: ctx.url.clone(),
            vendors,
            degraded,
            debug,
        }
    }
}
