//! Signature catalog loading.
//!
//! This module handles:
//! - Reading signature documents (JSON or YAML) from disk
//! - Normalizing both document layouts into a `SignatureCatalog`
//! - Holding named catalogs in a reloadable `CatalogStore`

mod document;
mod store;

use std::path::Path;
use tokio::fs;

use crate::error_handling::CatalogLoadError;
use crate::fingerprint::models::SignatureCatalog;

pub use document::from_value;
pub use store::CatalogStore;

/// Serialization format of a signature document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from the file extension: `.yaml`/`.yml` is YAML, anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Loads and normalizes a signature document from disk.
pub async fn load_catalog(path: &Path) -> Result<SignatureCatalog, CatalogLoadError> {
    log::debug!("Loading signature document from {}", path.display());
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_catalog(&text, DocumentFormat::from_path(path), &path.display().to_string())
}

/// Parses and normalizes a signature document held in memory.
///
/// `source` labels the catalog in logs, errors and `CatalogMetadata`.
pub fn parse_catalog(
    text: &str,
    format: DocumentFormat,
    source: &str,
) -> Result<SignatureCatalog, CatalogLoadError> {
    let parse_error = |message: String| CatalogLoadError::Parse {
        source_name: source.to_string(),
        message,
    };

    let value: serde_json::Value = match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| parse_error(e.to_string()))?,
        DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?,
    };

    from_value(value, source)
}
