//! Subscriber setup for tailspin's `tracing` events
//!
//! Library crates only emit events. Binaries and tests that want to see them
//! call [`init_logging`] once, either with an explicit [`LogConfig`] or one read
//! from the environment:
//!
//! - `TAILSPIN_LOG` - level (`error`, `warn`, `info`, `debug`, `trace`)
//! - `TAILSPIN_LOG_FORMAT` - `human` or `json`
//!
//! `RUST_LOG`, when set, overrides the level filter entirely.

use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as layer_fmt, EnvFilter};

/// Crates whose events the default filter lets through
const TARGETS: &[&str] = &[
    "tailspin_core",
    "tailspin_burst",
    "tailspin_radio",
    "tailspin_analysis",
];

pub const LEVEL_ENV: &str = "TAILSPIN_LOG";
pub const FORMAT_ENV: &str = "TAILSPIN_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogConfigError {
    #[error("unknown log level: {0}")]
    UnknownLevel(String),

    #[error("unknown log format: {0}")]
    UnknownFormat(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = LogConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LogConfigError::UnknownLevel(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr
    #[default]
    Human,
    /// One JSON object per event on stderr
    Json,
}

impl FromStr for LogFormat {
    type Err = LogConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "json" | "jsonl" => Ok(LogFormat::Json),
            _ => Err(LogConfigError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: LogLevel::Info,
            format: LogFormat::Human,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Quiet configuration for test runs
    pub fn test() -> Self {
        LogConfig {
            level: LogLevel::Warn,
            format: LogFormat::Human,
            timestamps: false,
        }
    }

    /// Read `TAILSPIN_LOG` and `TAILSPIN_LOG_FORMAT`, keeping defaults for
    /// unset or unparseable values.
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(LEVEL_ENV).ok().as_deref(),
            std::env::var(FORMAT_ENV).ok().as_deref(),
        )
    }

    pub fn from_values(level: Option<&str>, format: Option<&str>) -> Self {
        let defaults = LogConfig::default();
        LogConfig {
            level: level.and_then(|l| l.parse().ok()).unwrap_or(defaults.level),
            format: format.and_then(|f| f.parse().ok()).unwrap_or(defaults.format),
            timestamps: defaults.timestamps,
        }
    }

    /// Filter directive covering every tailspin crate
    pub fn directive(&self) -> String {
        TARGETS
            .iter()
            .map(|target| format!("{target}={}", self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install a global subscriber.
///
/// Returns `false` when one was already installed; the existing subscriber is
/// left untouched.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directive()));

    let result = match config.format {
        LogFormat::Human => {
            let layer = layer_fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                layer_fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true),
            )
            .try_init(),
    };

    result.is_ok()
}
