//! Tailspin Core - Fundamental types for traffic and radio energy analysis
//!
//! This crate defines the values shared by every analysis stage:
//! - Packets and the ordered packet timeline
//! - Traces with their duration, network type and UI markers
//! - Bursts and burst categories
//! - Radio families, power states and state intervals
//! - Device profiles and the energy model

pub mod packet;
pub mod trace;
pub mod burst;
pub mod radio;
pub mod profile;
pub mod error;

pub use packet::*;
pub use trace::*;
pub use burst::*;
pub use radio::*;
pub use profile::*;
pub use error::*;
