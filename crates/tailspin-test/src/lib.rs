//! Tailspin Test Harness - Pipeline validation
//!
//! This crate provides:
//! - Seeded random trace generation
//! - Hand-built trace scenarios
//! - Invariant checks over analysis reports
//! - A multi-seed, multi-family pipeline harness

pub mod generator;
pub mod scenario;
pub mod invariants;
pub mod harness;

pub use generator::*;
pub use scenario::*;
pub use invariants::*;
pub use harness::*;
