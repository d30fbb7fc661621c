//! Hand-built trace scenarios
//!
//! A small builder for deterministic traces plus a few canned scenarios that
//! exercise one classification rule or radio behavior each.

use tailspin_core::{
    Direction, Packet, PacketTimeline, RadioFamily, TailspinResult, Trace, UiEventMarkers,
};

/// Deterministic trace builder
#[derive(Clone, Debug)]
pub struct Scenario {
    family: RadioFamily,
    packets: Vec<Packet>,
    rotations: Vec<f64>,
    inputs: Vec<f64>,
    duration: Option<f64>,
}

impl Scenario {
    pub fn new(family: RadioFamily) -> Self {
        Scenario {
            family,
            packets: Vec::new(),
            rotations: Vec::new(),
            inputs: Vec::new(),
            duration: None,
        }
    }

    pub fn packet(mut self, packet: Packet) -> Self {
        self.packets.push(packet);
        self
    }

    /// `count` downlink data packets of `bytes` each, `spacing` seconds apart
    pub fn burst(mut self, start: f64, count: usize, spacing: f64, bytes: u32) -> Self {
        self.packets.extend(
            (0..count).map(|i| Packet::data(start + i as f64 * spacing, Direction::Downlink, bytes)),
        );
        self
    }

    /// `count` payload-free packets alternating direction
    pub fn control_burst(mut self, start: f64, count: usize, spacing: f64) -> Self {
        self.packets.extend((0..count).map(|i| {
            let direction = if i % 2 == 0 {
                Direction::Uplink
            } else {
                Direction::Downlink
            };
            Packet::control(start + i as f64 * spacing, direction)
        }));
        self
    }

    /// One small data packet every `cycle` seconds
    pub fn periodic(mut self, start: f64, cycle: f64, repeats: usize) -> Self {
        self.packets.extend(
            (0..repeats).map(|i| Packet::data(start + i as f64 * cycle, Direction::Uplink, 200)),
        );
        self
    }

    pub fn user_input(mut self, at: f64) -> Self {
        self.inputs.push(at);
        self
    }

    pub fn rotation(mut self, at: f64) -> Self {
        self.rotations.push(at);
        self
    }

    /// Trace duration; defaults to the last packet time
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Packets may have been added in any order
    pub fn build(self) -> TailspinResult<Trace> {
        let (timeline, _) = PacketTimeline::normalized(self.packets)?;
        let duration = self.duration.unwrap_or_else(|| timeline.last_timestamp());
        Ok(Trace::new(timeline, duration, self.family)?
            .with_markers(UiEventMarkers::new(self.rotations, self.inputs)))
    }
}

/// Four short TCP control exchanges inside one minute
pub fn tcp_cluster(family: RadioFamily) -> TailspinResult<Trace> {
    Scenario::new(family)
        .control_burst(0.0, 3, 0.05)
        .control_burst(15.0, 3, 0.05)
        .control_burst(30.0, 3, 0.05)
        .control_burst(45.0, 3, 0.05)
        .duration(90.0)
        .build()
}

/// Keep-alive every ten seconds
pub fn keepalive(family: RadioFamily, repeats: usize) -> TailspinResult<Trace> {
    Scenario::new(family)
        .periodic(0.0, 10.0, repeats)
        .duration(repeats as f64 * 10.0 + 20.0)
        .build()
}

/// One large download triggered by a tap
pub fn tap_then_download(family: RadioFamily) -> TailspinResult<Trace> {
    Scenario::new(family)
        .user_input(4.6)
        .burst(5.0, 4, 0.1, 1_400)
        .burst(30.0, 80, 0.1, 1_400)
        .duration(60.0)
        .build()
}
