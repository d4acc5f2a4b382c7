//! Vendor fingerprinting against declarative signature catalogs.
//!
//! A signature catalog lists vendors (analytics tags, CDPs, CMSs, ...) as
//! weighted matchers over a page snapshot. This module loads catalogs,
//! builds page snapshots and scores every vendor against them.
//!
//! ```no_run
//! # async fn run() -> Result<(), stack_fingerprint::CatalogLoadError> {
//! use stack_fingerprint::fingerprint::{detect, load_catalog, MatchContext};
//!
//! let catalog = load_catalog(std::path::Path::new("fingerprints.yaml")).await?;
//! let ctx = MatchContext::builder("https://example.com/")
//!     .html("<script src='https://cdn.segment.com/analytics.js'></script>")
//!     .extract_resources(true)
//!     .build();
//! let detections = detect(&catalog, &ctx);
//! # let _ = detections;
//! # Ok(())
//! # }
//! ```

pub mod context;
mod detection;
pub mod models;
mod patterns;
pub mod ruleset;

pub use context::{MatchContext, MatchContextBuilder};
pub use detection::{detect, DetectionResult, Detections};
pub use models::{
    CatalogMetadata, MatcherDefinition, MatcherKind, ScoringMode, SignatureCatalog,
    VendorDefinition,
};
pub use ruleset::{from_value, load_catalog, parse_catalog, CatalogStore, DocumentFormat};
