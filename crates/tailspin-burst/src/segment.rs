//! Burst segmentation
//!
//! Groups the packet timeline into bursts: a new burst starts whenever the
//! gap to the previous packet exceeds the burst threshold. A gap exactly equal
//! to the threshold stays inside the current burst.

use tailspin_core::{Burst, BurstThresholds, PacketTimeline};
use tracing::{debug, trace};

/// Splits a timeline into unclassified bursts
#[derive(Clone, Copy, Debug)]
pub struct BurstSegmenter {
    /// Maximum inter-packet gap inside one burst (seconds)
    gap: f64,
}

impl BurstSegmenter {
    pub fn new(gap: f64) -> Self {
        BurstSegmenter { gap }
    }

    pub fn from_thresholds(thresholds: &BurstThresholds) -> Self {
        Self::new(thresholds.burst_gap)
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Segment the timeline.
    ///
    /// The timeline is sorted by construction, so bursts come out ordered by
    /// begin time and never overlap. Every burst is tagged `Other` until the
    /// classifier runs.
    pub fn segment(&self, timeline: &PacketTimeline) -> Vec<Burst> {
        let packets = timeline.packets();
        let mut bursts = Vec::new();

        let Some(first) = packets.first() else {
            return bursts;
        };

        let mut start = 0usize;
        let mut begin_time = first.timestamp;
        let mut bytes = first.length as u64;

        for (index, pair) in packets.windows(2).enumerate() {
            let (prev, packet) = (&pair[0], &pair[1]);
            let current = index + 1;

            if packet.timestamp - prev.timestamp <= self.gap {
                bytes += packet.length as u64;
                continue;
            }

            let burst = Burst::new(begin_time, prev.timestamp, start..current, bytes);
            trace!(
                begin = burst.begin_time,
                end = burst.end_time,
                packets = burst.packet_count(),
                "burst closed"
            );
            bursts.push(burst);

            start = current;
            begin_time = packet.timestamp;
            bytes = packet.length as u64;
        }

        bursts.push(Burst::new(
            begin_time,
            timeline.last_timestamp(),
            start..packets.len(),
            bytes,
        ));

        debug!(
            packets = packets.len(),
            bursts = bursts.len(),
            gap = self.gap,
            "timeline segmented"
        );
        bursts
    }
}
