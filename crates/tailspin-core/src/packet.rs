//! Packet records and the ordered packet timeline
//!
//! The timeline is the only input the burst engine reads. It is produced by an
//! external capture/decoder layer and is immutable once built.

use serde::{Deserialize, Serialize};

use crate::{TailspinError, TailspinResult};

/// Packet direction relative to the device
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Device to network
    Uplink,
    /// Network to device
    Downlink,
}

/// A single captured packet
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Seconds since trace start
    pub timestamp: f64,
    pub direction: Direction,
    /// Bytes on the wire
    pub length: u32,
    /// Carries no payload (pure SYN/ACK/FIN/RST)
    pub control_only: bool,
}

impl Packet {
    /// Packet carrying payload
    pub fn data(timestamp: f64, direction: Direction, length: u32) -> Self {
        Packet {
            timestamp,
            direction,
            length,
            control_only: false,
        }
    }

    /// Payload-free TCP control packet (40 bytes of headers)
    pub fn control(timestamp: f64, direction: Direction) -> Self {
        Packet {
            timestamp,
            direction,
            length: 40,
            control_only: true,
        }
    }

    #[inline]
    pub fn is_uplink(&self) -> bool {
        self.direction == Direction::Uplink
    }
}

/// Packets sorted ascending by timestamp, ties kept in capture order
///
/// Deserialization goes through [`PacketTimeline::new`], so a decoded
/// timeline is sorted or the decode fails.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeline")]
pub struct PacketTimeline {
    packets: Vec<Packet>,
}

/// Wire shape of a timeline before validation
#[derive(Deserialize)]
pub(crate) struct RawTimeline {
    pub(crate) packets: Vec<Packet>,
}

impl TryFrom<RawTimeline> for PacketTimeline {
    type Error = TailspinError;

    fn try_from(raw: RawTimeline) -> TailspinResult<Self> {
        PacketTimeline::new(raw.packets)
    }
}

impl PacketTimeline {
    /// Build a timeline, rejecting unsorted or non-finite timestamps.
    pub fn new(packets: Vec<Packet>) -> TailspinResult<Self> {
        validate_timestamps(&packets)?;
        validate_order(&packets)?;
        Ok(PacketTimeline { packets })
    }

    /// Build a timeline from packets in arbitrary order.
    ///
    /// Packets are stable-sorted by timestamp, so equal timestamps keep their
    /// capture order. Returns the timeline and whether any reordering happened.
    pub fn normalized(mut packets: Vec<Packet>) -> TailspinResult<(Self, bool)> {
        validate_timestamps(&packets)?;

        let sorted = packets
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp);
        if !sorted {
            packets.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        }

        Ok((PacketTimeline { packets }, !sorted))
    }

    /// Re-check the ordering contract on an existing timeline
    pub fn validate(&self) -> TailspinResult<()> {
        validate_timestamps(&self.packets)?;
        validate_order(&self.packets)
    }

    /// Empty timeline
    pub fn empty() -> Self {
        PacketTimeline::default()
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn get(&self, index: usize) -> Option<&Packet> {
        self.packets.get(index)
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Timestamp of the last packet, 0.0 when empty
    pub fn last_timestamp(&self) -> f64 {
        self.packets.last().map_or(0.0, |p| p.timestamp)
    }

    /// Packets with `start <= timestamp < end`.
    pub fn packets_between(&self, start: f64, end: f64) -> &[Packet] {
        let lo = self.packets.partition_point(|p| p.timestamp < start);
        let hi = self.packets.partition_point(|p| p.timestamp < end);
        if lo >= hi {
            &[]
        } else {
            &self.packets[lo..hi]
        }
    }
}

fn validate_timestamps(packets: &[Packet]) -> TailspinResult<()> {
    for (index, packet) in packets.iter().enumerate() {
        if !packet.timestamp.is_finite() || packet.timestamp < 0.0 {
            return Err(TailspinError::InvalidTimestamp {
                index,
                value: packet.timestamp,
            });
        }
    }
    Ok(())
}

fn validate_order(packets: &[Packet]) -> TailspinResult<()> {
    for (index, pair) in packets.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(TailspinError::UnsortedTimeline {
                index: index + 1,
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }
    }
    Ok(())
}
