//! A captured trace: packets, duration, network type and UI markers

use serde::{Deserialize, Serialize};

use crate::packet::RawTimeline;
use crate::{PacketTimeline, RadioFamily, TailspinError, TailspinResult};

/// UI event timestamps recorded alongside the capture
///
/// Both lists are kept ascending; decoding sorts them the same way
/// [`UiEventMarkers::new`] does.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMarkers")]
pub struct UiEventMarkers {
    /// Screen orientation changes (seconds, ascending)
    screen_rotations: Vec<f64>,
    /// Taps, key presses and other user input (seconds, ascending)
    user_inputs: Vec<f64>,
}

#[derive(Deserialize)]
struct RawMarkers {
    #[serde(default)]
    screen_rotations: Vec<f64>,
    #[serde(default)]
    user_inputs: Vec<f64>,
}

impl From<RawMarkers> for UiEventMarkers {
    fn from(raw: RawMarkers) -> Self {
        UiEventMarkers::new(raw.screen_rotations, raw.user_inputs)
    }
}

impl UiEventMarkers {
    pub fn new(mut screen_rotations: Vec<f64>, mut user_inputs: Vec<f64>) -> Self {
        screen_rotations.sort_by(f64::total_cmp);
        user_inputs.sort_by(f64::total_cmp);
        UiEventMarkers {
            screen_rotations,
            user_inputs,
        }
    }

    pub fn screen_rotations(&self) -> &[f64] {
        &self.screen_rotations
    }

    pub fn user_inputs(&self) -> &[f64] {
        &self.user_inputs
    }

    pub fn is_empty(&self) -> bool {
        self.screen_rotations.is_empty() && self.user_inputs.is_empty()
    }
}

/// Immutable input snapshot for one analysis run
///
/// Decoding runs the same checks as [`Trace::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrace")]
pub struct Trace {
    timeline: PacketTimeline,
    duration: f64,
    family: RadioFamily,
    markers: UiEventMarkers,
}

#[derive(Deserialize)]
struct RawTrace {
    timeline: RawTimeline,
    duration: f64,
    family: RadioFamily,
    #[serde(default)]
    markers: UiEventMarkers,
}

impl TryFrom<RawTrace> for Trace {
    type Error = TailspinError;

    fn try_from(raw: RawTrace) -> TailspinResult<Self> {
        let timeline = PacketTimeline::new(raw.timeline.packets)?;
        Ok(Trace::new(timeline, raw.duration, raw.family)?.with_markers(raw.markers))
    }
}

impl Trace {
    /// Create a trace. The duration must cover the last packet.
    pub fn new(timeline: PacketTimeline, duration: f64, family: RadioFamily) -> TailspinResult<Self> {
        check_duration(&timeline, duration)?;

        Ok(Trace {
            timeline,
            duration,
            family,
            markers: UiEventMarkers::default(),
        })
    }

    /// Parse a JSON trace document, keeping the precise input error.
    pub fn from_json(document: &str) -> TailspinResult<Self> {
        let raw: RawTrace = serde_json::from_str(document)
            .map_err(|e| TailspinError::TraceFormat(e.to_string()))?;
        Trace::try_from(raw)
    }

    /// Re-check the input contract: sorted finite timestamps and a
    /// duration covering the last packet.
    pub fn validate(&self) -> TailspinResult<()> {
        self.timeline.validate()?;
        check_duration(&self.timeline, self.duration)
    }

    /// Attach UI event markers
    pub fn with_markers(mut self, markers: UiEventMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn timeline(&self) -> &PacketTimeline {
        &self.timeline
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn family(&self) -> RadioFamily {
        self.family
    }

    pub fn markers(&self) -> &UiEventMarkers {
        &self.markers
    }
}

fn check_duration(timeline: &PacketTimeline, duration: f64) -> TailspinResult<()> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(TailspinError::InvalidDuration(duration));
    }
    if duration < timeline.last_timestamp() {
        return Err(TailspinError::TraceTooShort {
            last_packet: timeline.last_timestamp(),
            duration,
        });
    }
    Ok(())
}
