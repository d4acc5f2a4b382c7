//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options for the `stack_fingerprint` binary.
///
/// The page snapshot is supplied piecewise: the body (and any external script
/// bodies) from files, headers and cookies as repeated flags.
#[derive(Debug, Parser)]
#[command(
    name = "stack_fingerprint",
    about = "Fingerprint the technology stack of a captured web page"
)]
pub struct Opt {
    /// Signature catalog (YAML or JSON)
    #[arg(long, short = 's', value_name = "PATH")]
    pub signatures: PathBuf,

    /// URL the page was fetched from
    #[arg(long, short = 'u')]
    pub url: String,

    /// File containing the page body
    #[arg(long, value_name = "PATH")]
    pub html: Option<PathBuf>,

    /// External script body to append to the page body (repeatable)
    #[arg(long = "script-body", value_name = "PATH")]
    pub script_bodies: Vec<PathBuf>,

    /// Response header as "Name: value" (repeatable)
    #[arg(long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Cookie as "name=value" (repeatable)
    #[arg(long = "cookie", value_name = "NAME=VALUE")]
    pub cookies: Vec<String>,

    /// Additional resource URL discovered outside the page body (repeatable)
    #[arg(long = "resource", value_name = "URL")]
    pub resources: Vec<String>,

    /// Include confidence and evidence instead of vendor names only
    #[arg(long)]
    pub debug: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Continue with an empty catalog if the signatures cannot be loaded
    #[arg(long)]
    pub allow_degraded: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use stack_fingerprint::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     signatures: PathBuf::from("fingerprints.yaml"),
///     url: "https://example.com/".to_string(),
///     debug: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Signature catalog path
    pub signatures: PathBuf,

    /// Page URL
    pub url: String,

    /// Page body file
    pub html: Option<PathBuf>,

    /// External script bodies appended to the page body
    pub script_bodies: Vec<PathBuf>,

    /// Raw "Name: value" header lines
    pub headers: Vec<String>,

    /// Raw "name=value" cookie pairs
    pub cookies: Vec<String>,

    /// Extra resource URLs
    pub resources: Vec<String>,

    /// Emit confidence and evidence
    pub debug: bool,

    /// Pretty-print output
    pub pretty: bool,

    /// Fall back to an empty catalog when loading fails
    pub allow_degraded: bool,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            signatures: PathBuf::from("fingerprints.yaml"),
            url: String::new(),
            html: None,
            script_bodies: Vec::new(),
            headers: Vec::new(),
            cookies: Vec::new(),
            resources: Vec::new(),
            debug: false,
            pretty: false,
            allow_degraded: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            signatures: opt.signatures,
            url: opt.url,
            html: opt.html,
            script_bodies: opt.script_bodies,
            headers: opt.headers,
            cookies: opt.cookies,
            resources: opt.resources,
            debug: opt.debug,
            pretty: opt.pretty,
            allow_degraded: opt.allow_degraded,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.signatures, PathBuf::from("fingerprints.yaml"));
        assert!(config.url.is_empty());
        assert!(config.html.is_none());
        assert!(!config.debug);
        assert!(!config.allow_degraded);
    }

    #[test]
    fn test_opt_parses_repeated_flags() {
        let opt = Opt::try_parse_from([
            "stack_fingerprint",
            "--signatures",
            "sigs.yaml",
            "--url",
            "https://example.com/",
            "--header",
            "Server: nginx",
            "--header",
            "X-Powered-By: PHP",
            "--cookie",
            "ajs_user_id=1",
            "--resource",
            "https://cdn.example.com/a.js",
            "--debug",
        ])
        .expect("Failed to parse CLI arguments");

        assert_eq!(opt.headers.len(), 2);
        assert_eq!(opt.cookies, vec!["ajs_user_id=1"]);
        assert_eq!(opt.resources.len(), 1);
        assert!(opt.debug);
        assert!(!opt.pretty);

        let config = Config::from(opt);
        assert_eq!(config.signatures, PathBuf::from("sigs.yaml"));
        assert_eq!(config.url, "https://example.com/");
    }

    #[test]
    fn test_opt_requires_signatures_and_url() {
        assert!(Opt::try_parse_from(["stack_fingerprint", "--url", "https://a.test"]).is_err());
        assert!(Opt::try_parse_from(["stack_fingerprint", "--signatures", "s.yaml"]).is_err());
    }

    #[test]
    fn test_opt_log_format_value_enum() {
        let opt = Opt::try_parse_from([
            "stack_fingerprint",
            "-s",
            "s.yaml",
            "-u",
            "https://a.test",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("Failed to parse CLI arguments");
        assert!(matches!(opt.log_format, LogFormat::Json));
        assert!(matches!(opt.log_level, LogLevel::Debug));
    }
}
