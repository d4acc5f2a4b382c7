//! Error type definitions.
//!
//! This module defines the error types surfaced by the library: logger setup
//! failures and signature catalog load failures.

use std::path::PathBuf;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for signature catalog loading.
///
/// Any of these is fatal to the caller that requested the load. Individual
/// malformed matchers are not errors; they are logged and never match.
#[derive(Error, Debug)]
pub enum CatalogLoadError {
    /// The signature document could not be read.
    #[error("Failed to read signature document {}: {source}", .path.display())]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The signature document is not valid JSON/YAML.
    #[error("Failed to parse signature document {source_name}: {message}")]
    Parse {
        /// Path or label of the document
        source_name: String,
        /// Parser error message
        message: String,
    },

    /// The document parsed but does not have the expected shape.
    #[error("Invalid signature document structure: {0}")]
    InvalidStructure(String),

    /// A default or per-vendor threshold is not a positive finite number.
    #[error("Invalid threshold for {scope}: {value}")]
    InvalidThreshold {
        /// `default` or the vendor name
        scope: String,
        /// The offending value as written
        value: String,
    },

    /// Two vendor entries share the same name.
    #[error("Duplicate vendor name: {0}")]
    DuplicateVendor(String),

    /// A catalog store was asked for a name it has no source for.
    #[error("No signature source registered as '{0}'")]
    UnknownCatalog(String),
}
