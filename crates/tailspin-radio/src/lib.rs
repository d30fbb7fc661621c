//! Tailspin Radio Engine - Power-state simulation and statistics
//!
//! This crate replays classified bursts against a radio model:
//! - Per-family transition tables (3G RRC, LTE RRC, WiFi power save)
//! - Interval simulation tiling the whole trace
//! - Per-state time, ratio and energy reduction
//! - Burst energy attribution

pub mod table;
pub mod simulator;
pub mod statistics;
pub mod energy;

pub use table::*;
pub use simulator::*;
pub use statistics::*;
pub use energy::*;
