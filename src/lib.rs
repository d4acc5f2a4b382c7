//! stack_fingerprint library: vendor fingerprinting for captured web pages
//!
//! This library matches a page snapshot (body, URL, headers, cookies and
//! discovered resource URLs) against a declarative catalog of weighted vendor
//! signatures and reports the detected vendors grouped by category, each with
//! a confidence score and the evidence that matched.
//!
//! # Example
//!
//! ```no_run
//! use stack_fingerprint::{run_analysis, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     signatures: std::path::PathBuf::from("fingerprints.yaml"),
//!     url: "https://example.com/".to_string(),
//!     html: Some(std::path::PathBuf::from("page.html")),
//!     ..Default::default()
//! };
//!
//! let response = run_analysis(config).await?;
//! println!("{}", serde_json::to_string(&response.vendors)?);
//! # Ok(())
//! # }
//! ```
//!
//! Detection itself (`detect`) is synchronous and does no I/O; only catalog
//! loading and `run_analysis` need a Tokio runtime.

#![warn(missing_docs)]

pub mod config;
mod error_handling;
pub mod fingerprint;
pub mod initialization;
pub mod report;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{CatalogLoadError, InitializationError};
pub use fingerprint::{
    detect, load_catalog, parse_catalog, CatalogStore, DetectionResult, Detections,
    DocumentFormat, MatchContext, MatcherKind, SignatureCatalog,
};
pub use report::{collapse, AnalyzeResponse};
pub use run::run_analysis;

// Internal run module (wires file inputs, catalog loading and detection together)
mod run {
    use anyhow::{Context, Result};
    use log::{info, warn};
    use tokio::fs;

    use crate::config::Config;
    use crate::fingerprint::{detect, load_catalog, MatchContext, SignatureCatalog};
    use crate::report::AnalyzeResponse;

    /// Analyzes one captured page as described by `config`.
    ///
    /// Reads the signature catalog and the page inputs from disk, builds the
    /// match context (script sources and resource hints are extracted from the
    /// body) and runs detection.
    ///
    /// # Errors
    ///
    /// Fails if an input file cannot be read, or if the catalog cannot be
    /// loaded and `allow_degraded` is off.
    pub async fn run_analysis(config: Config) -> Result<AnalyzeResponse> {
        let (catalog, degraded) = match load_catalog(&config.signatures).await {
            Ok(catalog) => (catalog, false),
            Err(e) if config.allow_degraded => {
                warn!("{}; continuing with an empty signature catalog", e);
                (SignatureCatalog::empty(), true)
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "Failed to load signature catalog {}",
                        config.signatures.display()
                    )
                })
            }
        };

        let mut builder = MatchContext::builder(config.url.as_str()).extract_resources(true);

        if let Some(path) = &config.html {
            let html = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read page body {}", path.display()))?;
            builder = builder.html(html);
        }
        for path in &config.script_bodies {
            let body = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read script body {}", path.display()))?;
            builder = builder.script_body(body);
        }
        for line in &config.headers {
            builder = builder.header_line(line);
        }
        for pair in &config.cookies {
            builder = builder.cookie_pair(pair);
        }
        for url in &config.resources {
            builder = builder.resource_url(url.as_str());
        }

        let ctx = builder.build();
        let detections = detect(&catalog, &ctx);
        info!(
            "Analyzed {}: {} vendor(s) detected",
            ctx.url,
            detections.values().map(|v| v.len()).sum::<usize>()
        );

        Ok(AnalyzeResponse::new(
            &ctx,
            &catalog,
            detections,
            config.debug,
            degraded,
        ))
    }

}
