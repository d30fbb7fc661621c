//! Bursts and burst cause categories

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{Packet, PacketTimeline};

/// Cause assigned to a burst
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BurstCategory {
    /// Triggered by a user interaction
    UserInput,
    /// First burst following a screen orientation change
    ScreenRotation,
    /// Only TCP control packets, no payload
    TcpProtocolOnly,
    /// Part of a repeating transfer pattern
    Periodic,
    /// Long or large transfer
    LongBurst,
    /// Anything else
    #[default]
    Other,
}

impl BurstCategory {
    pub fn all() -> &'static [BurstCategory] {
        &[
            BurstCategory::UserInput,
            BurstCategory::ScreenRotation,
            BurstCategory::TcpProtocolOnly,
            BurstCategory::Periodic,
            BurstCategory::LongBurst,
            BurstCategory::Other,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            BurstCategory::UserInput => "User Input",
            BurstCategory::ScreenRotation => "Screen Rotation",
            BurstCategory::TcpProtocolOnly => "TCP Protocol",
            BurstCategory::Periodic => "Periodic",
            BurstCategory::LongBurst => "Long Burst",
            BurstCategory::Other => "Other",
        }
    }
}

impl fmt::Display for BurstCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A time-contiguous cluster of packets
///
/// A burst owns no packets, it indexes a contiguous run of the timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    /// Timestamp of the first packet
    pub begin_time: f64,
    /// Timestamp of the last packet
    pub end_time: f64,
    pub category: BurstCategory,
    /// Joules attributed to this burst by the radio simulation
    pub energy: f64,
    /// Indices into the packet timeline
    pub packets: Range<usize>,
    /// Total bytes of member packets
    pub bytes: u64,
}

impl Burst {
    pub fn new(begin_time: f64, end_time: f64, packets: Range<usize>, bytes: u64) -> Self {
        Burst {
            begin_time,
            end_time,
            category: BurstCategory::Other,
            energy: 0.0,
            packets,
            bytes,
        }
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end_time - self.begin_time
    }

    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    /// Member packets of this burst
    pub fn members<'a>(&self, timeline: &'a PacketTimeline) -> &'a [Packet] {
        timeline
            .packets()
            .get(self.packets.clone())
            .unwrap_or(&[])
    }

    pub fn with_category(mut self, category: BurstCategory) -> Self {
        self.category = category;
        self
    }
}
