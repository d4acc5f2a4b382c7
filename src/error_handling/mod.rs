//! Error handling.
//!
//! This module provides the error types shared by the catalog loader and the
//! application setup code.

mod types;

// Re-export public API
pub use types::{CatalogLoadError, InitializationError};
