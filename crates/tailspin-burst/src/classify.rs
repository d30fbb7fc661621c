//! Burst cause classification
//!
//! Every burst gets exactly one category. Rules are tried in priority order
//! and the first match wins:
//!
//! 1. ScreenRotation - first burst starting within the rotation window after a
//!    screen rotation (later rotations do not match again)
//! 2. TcpProtocolOnly - every member packet is payload-free
//! 3. UserInput - a user input event falls in `[begin - window, end]`
//! 4. Periodic - the burst continues a detected repeat cycle
//! 5. LongBurst - duration or size at or above the long/large thresholds
//! 6. Other
//!
//! The scan is a fold over the burst sequence. The only state carried from one
//! burst to the next is the [`ClassifierState`] accumulator.

use tailspin_core::{Burst, BurstCategory, BurstThresholds, Packet, PacketTimeline, UiEventMarkers};
use tracing::{debug, trace};

use crate::{Periodicity, PeriodicityDetector};

/// Accumulator threaded through the classification fold
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClassifierState {
    /// Begin time of the first rotation-triggered burst
    pub rotation_burst_time: Option<f64>,
    /// Length of the current run of consecutive UserInput bursts
    pub user_input_run: usize,
    /// Longest UserInput run seen so far
    pub max_user_input_run: usize,
}

impl ClassifierState {
    /// State after a burst of `category` starting at `begin_time`
    pub fn advance(self, category: BurstCategory, begin_time: f64) -> Self {
        let rotation_burst_time = match (self.rotation_burst_time, category) {
            (None, BurstCategory::ScreenRotation) => Some(begin_time),
            (existing, _) => existing,
        };

        let user_input_run = if category == BurstCategory::UserInput {
            self.user_input_run + 1
        } else {
            0
        };

        ClassifierState {
            rotation_burst_time,
            user_input_run,
            max_user_input_run: self.max_user_input_run.max(user_input_run),
        }
    }
}

/// Output of one classification pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub bursts: Vec<Burst>,
    pub periodicity: Periodicity,
    pub state: ClassifierState,
}

/// Assigns a cause category to each burst
#[derive(Clone, Debug)]
pub struct BurstClassifier {
    thresholds: BurstThresholds,
}

impl BurstClassifier {
    pub fn new(thresholds: BurstThresholds) -> Self {
        BurstClassifier { thresholds }
    }

    pub fn thresholds(&self) -> &BurstThresholds {
        &self.thresholds
    }

    /// Classify a segmented burst sequence
    pub fn classify(
        &self,
        bursts: Vec<Burst>,
        timeline: &PacketTimeline,
        markers: &UiEventMarkers,
    ) -> Classification {
        let begin_times: Vec<f64> = bursts.iter().map(|b| b.begin_time).collect();
        let periodicity = PeriodicityDetector::from_thresholds(&self.thresholds).detect(&begin_times);

        let (classified, state) = bursts.into_iter().enumerate().fold(
            (Vec::with_capacity(begin_times.len()), ClassifierState::default()),
            |(mut classified, state), (index, burst)| {
                let category = self.categorize(
                    &burst,
                    burst.members(timeline),
                    markers,
                    periodicity.cycle(index),
                    &state,
                );
                trace!(index, begin = burst.begin_time, %category, "burst classified");

                let state = state.advance(category, burst.begin_time);
                classified.push(burst.with_category(category));
                (classified, state)
            },
        );

        debug!(
            bursts = classified.len(),
            max_user_input_run = state.max_user_input_run,
            rotation_burst = ?state.rotation_burst_time,
            "bursts classified"
        );

        Classification {
            bursts: classified,
            periodicity,
            state,
        }
    }

    /// Category of a single burst given the accumulated state
    pub fn categorize(
        &self,
        burst: &Burst,
        members: &[Packet],
        markers: &UiEventMarkers,
        periodic_cycle: Option<f64>,
        state: &ClassifierState,
    ) -> BurstCategory {
        let th = &self.thresholds;

        if state.rotation_burst_time.is_none()
            && follows_event(markers.screen_rotations(), burst.begin_time, th.screen_rotation_window)
        {
            return BurstCategory::ScreenRotation;
        }

        if !members.is_empty() && members.iter().all(|p| p.control_only) {
            return BurstCategory::TcpProtocolOnly;
        }

        if any_event_in(
            markers.user_inputs(),
            burst.begin_time - th.user_input_window,
            burst.end_time,
        ) {
            return BurstCategory::UserInput;
        }

        if periodic_cycle.is_some() {
            return BurstCategory::Periodic;
        }

        if burst.duration() >= th.long_burst_duration || burst.bytes >= th.large_burst_size {
            return BurstCategory::LongBurst;
        }

        BurstCategory::Other
    }
}

/// Some event happened at most `window` seconds before `t` (inclusive).
fn follows_event(events: &[f64], t: f64, window: f64) -> bool {
    let at_or_before = events.partition_point(|&e| e <= t);
    at_or_before > 0 && t - events[at_or_before - 1] <= window
}

/// Some event lies in `[start, end]`.
fn any_event_in(events: &[f64], start: f64, end: f64) -> bool {
    let first = events.partition_point(|&e| e < start);
    first < events.len() && events[first] <= end
}
