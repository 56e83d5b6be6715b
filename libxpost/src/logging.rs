//! Logging setup for the xpost binary
//!
//! All log output goes to stderr so stdout stays reserved for the post URL
//! (or the JSON result). `RUST_LOG` takes precedence over the configured level.
//!
//! # Examples
//!
//! ```no_run
//! use libxpost::logging::{LoggingConfig, LogFormat};
//!
//! let config = LoggingConfig::new(LogFormat::Json, "info".to_string(), false);
//! config.init();
//!
//! // Or read XPOST_LOG_FORMAT / XPOST_LOG_LEVEL
//! libxpost::logging::init_default();
//! ```

use std::str::FromStr;

pub const ENV_LOG_FORMAT: &str = "XPOST_LOG_FORMAT";
pub const ENV_LOG_LEVEL: &str = "XPOST_LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "error";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for piping)
    #[default]
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
    pub verbose: bool,
}

impl LoggingConfig {
    /// * `level` - filter directive, e.g. `warn` or `libxpost=debug`
    /// * `verbose` - overrides `level` with `debug`
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Settings from `XPOST_LOG_FORMAT` and `XPOST_LOG_LEVEL`
    ///
    /// Unset or unparseable values fall back to text format at error level.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = lookup(ENV_LOG_FORMAT)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let level = lookup(ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self::new(format, level, false)
    }

    /// Filter directive in effect when `RUST_LOG` is unset
    pub fn directive(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.level
        }
    }

    /// Install the global subscriber, writing to stderr
    ///
    /// Returns `false` when a subscriber was already installed; the existing
    /// one stays in place.
    pub fn init(&self) -> bool {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.directive()));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        let installed = match self.format {
            // One object per line, span context flattened in
            LogFormat::Json => builder
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => builder
                .pretty()
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .try_init(),
            // Short lines that sit next to the CLI's own Warning:/Error: output
            LogFormat::Text => builder
                .without_time()
                .with_target(false)
                .with_ansi(false)
                .try_init(),
        };

        installed.is_ok()
    }
}

/// Initialize logging with default settings
///
/// ```bash
/// export XPOST_LOG_FORMAT=json
/// export XPOST_LOG_LEVEL=debug
/// xpost "Hello world"
/// ```
pub fn init_default() {
    LoggingConfig::from_env().init();
}
