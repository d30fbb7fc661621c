//! Tailspin Analysis - Pipeline runner and logging setup
//!
//! This crate ties the engines together:
//! - [`Analyzer`]: segment, classify, simulate, reduce and attribute energy
//!   for one trace
//! - [`AnalysisReport`]: the immutable result of a run
//! - [`logging`]: `tracing-subscriber` initialization for binaries and tests

pub mod analyzer;
pub mod logging;
pub mod report;

pub use analyzer::*;
pub use logging::{init_logging, LogConfig, LogConfigError, LogFormat, LogLevel};
pub use report::*;
