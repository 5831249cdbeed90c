//! Centralized logging configuration for Omnicast binaries
//!
//! All output goes to stderr so that stdout stays reserved for results.
//! Supports text, JSON and pretty formats, configured either explicitly or
//! through `OMNICAST_LOG_FORMAT` / `OMNICAST_LOG_LEVEL`. `RUST_LOG` still
//! wins when set.
//!
//! # Examples
//!
//! ```no_run
//! use libomnicast::logging::{LoggingConfig, LogFormat};
//!
//! LoggingConfig::new(LogFormat::Json, "info".to_string(), false).init();
//!
//! // Or read OMNICAST_LOG_FORMAT / OMNICAST_LOG_LEVEL
//! libomnicast::logging::init_default();
//! ```

use std::str::FromStr;
use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_ENV_VAR: &str = "OMNICAST_LOG_FORMAT";
pub const LOG_LEVEL_ENV_VAR: &str = "OMNICAST_LOG_LEVEL";

/// Level used when nothing else is configured; dispatch failures are
/// reported in the results, so only warnings surface by default
const DEFAULT_LEVEL: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for piping)
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    /// Forces debug level regardless of `level`
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read format and level from the environment
    ///
    /// Unparseable formats fall back to text rather than failing startup.
    pub fn from_env(verbose: bool) -> Self {
        Self::from_lookup(verbose, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(verbose: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = lookup(LOG_FORMAT_ENV_VAR)
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);
        let level = lookup(LOG_LEVEL_ENV_VAR).unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        Self::new(format, level, verbose)
    }

    fn filter(&self) -> EnvFilter {
        if self.verbose {
            return EnvFilter::new("debug");
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Install the global subscriber
    ///
    /// Returns `false` if a subscriber was already installed (for example
    /// by a test harness); logging then goes to the existing one.
    pub fn init(&self) -> bool {
        let filter = self.filter();

        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .try_init(),
        };

        installed.is_ok()
    }
}

/// Initialize logging from `OMNICAST_LOG_FORMAT` and `OMNICAST_LOG_LEVEL`
///
/// ```bash
/// export OMNICAST_LOG_FORMAT=json
/// export OMNICAST_LOG_LEVEL=debug
/// omni-post "Hello world" --provider slack
/// ```
pub fn init_default() -> bool {
    LoggingConfig::from_env(false).init()
}
