//! Application configuration and constants.
//!
//! This module provides:
//! - Defaults and document vocabulary constants
//! - CLI option types and the library-level `Config`

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, Opt};
