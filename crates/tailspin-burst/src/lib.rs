//! Tailspin Burst Engine - Segmentation and cause classification
//!
//! This crate turns a packet timeline into classified bursts:
//! - Gap-threshold segmentation into bursts
//! - Periodic transfer detection
//! - Priority-ordered cause classification
//! - Aggregate burst collection and burst-level best-practice verdicts

pub mod segment;
pub mod periodic;
pub mod classify;
pub mod collection;
pub mod practices;

pub use segment::*;
pub use periodic::*;
pub use classify::*;
pub use collection::*;
pub use practices::*;
