//! Burst energy attribution
//!
//! Each burst is charged for the radio time it caused: from the start of the
//! promotion that woke the radio for it (or its begin when none was paid)
//! until the next burst takes over, tail included. The last burst keeps
//! everything up to the end of the trace.

use tailspin_core::{Burst, EnergyModel, PacketTimeline, StateInterval};
use tracing::trace;

/// Fill in `energy` on every burst from a simulated interval sequence
pub fn attribute_energy<M: EnergyModel + ?Sized>(
    bursts: &mut [Burst],
    intervals: &[StateInterval],
    timeline: &PacketTimeline,
    model: &M,
    duration: f64,
) {
    let starts: Vec<f64> = bursts
        .iter()
        .map(|burst| attribution_start(intervals, burst.begin_time))
        .collect();

    for (index, burst) in bursts.iter_mut().enumerate() {
        let from = starts[index];
        let to = starts.get(index + 1).copied().unwrap_or(duration);
        burst.energy = span_energy(intervals, timeline, model, from, to);
        trace!(index, from, to, energy = burst.energy, "burst energy attributed");
    }
}

/// Start of the promotion ending at `begin`, or `begin` itself
fn attribution_start(intervals: &[StateInterval], begin: f64) -> f64 {
    let before = intervals.partition_point(|interval| interval.end <= begin);
    match before.checked_sub(1).map(|i| &intervals[i]) {
        Some(interval) if interval.end == begin && interval.state.is_promotion() => interval.start,
        _ => begin,
    }
}

/// Energy of the intervals clipped to `[from, to)`
fn span_energy<M: EnergyModel + ?Sized>(
    intervals: &[StateInterval],
    timeline: &PacketTimeline,
    model: &M,
    from: f64,
    to: f64,
) -> f64 {
    let first = intervals.partition_point(|interval| interval.end <= from);
    intervals[first..]
        .iter()
        .take_while(|interval| interval.start < to)
        .map(|interval| {
            let start = interval.start.max(from);
            let end = interval.end.min(to);
            model.energy(start, end, interval.state, timeline.packets_between(start, end))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RadioStateSimulator;
    use tailspin_core::{Profile, RadioState};

    fn burst(begin: f64, end: f64) -> Burst {
        Burst::new(begin, end, 0..1, 100)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn attribute(profile: &Profile, bursts: &mut [Burst], duration: f64) -> Vec<StateInterval> {
        let intervals = RadioStateSimulator::for_profile(profile).simulate(bursts, duration);
        attribute_energy(bursts, &intervals, &PacketTimeline::empty(), profile, duration);
        intervals
    }

    #[test]
    fn test_single_burst_takes_tail() {
        let profile = Profile::umts();
        let mut bursts = vec![burst(0.0, 0.2)];
        attribute(&profile, &mut bursts, 10.0);
        assert_close(bursts[0].energy, 0.8 * 5.2 + 0.46 * 4.8);
    }

    #[test]
    fn test_promotion_charged_to_following_burst() {
        let profile = Profile::umts();
        let mut bursts = vec![burst(0.0, 1.0), burst(30.0, 31.0)];
        let intervals = attribute(&profile, &mut bursts, 40.0);

        let promotion = intervals
            .iter()
            .find(|i| i.state == RadioState::IdleToDchPromotion)
            .unwrap();
        assert_close(promotion.start, 28.0);

        // First burst: 6 s DCH, 12 s FACH, idle until the promotion
        assert_close(bursts[0].energy, 0.8 * 6.0 + 0.46 * 12.0);
        // Second burst: 2 s promotion, 6 s DCH, 4 s FACH
        assert_close(bursts[1].energy, 0.55 * 2.0 + 0.8 * 6.0 + 0.46 * 4.0);
    }

    #[test]
    fn test_attribution_covers_all_energy_after_first_burst() {
        let profile = Profile::lte();
        let mut bursts = vec![burst(5.0, 6.0), burst(7.0, 9.5), burst(40.0, 41.0)];
        let intervals = attribute(&profile, &mut bursts, 60.0);

        let from = attribution_start(&intervals, 5.0);
        let expected = span_energy(&intervals, &PacketTimeline::empty(), &profile, from, 60.0);
        let attributed: f64 = bursts.iter().map(|b| b.energy).sum();
        assert_close(attributed, expected);
    }

    #[test]
    fn test_attribution_start() {
        let intervals = vec![
            StateInterval::new(0.0, 8.0, RadioState::Idle),
            StateInterval::new(8.0, 10.0, RadioState::IdleToDchPromotion),
            StateInterval::new(10.0, 11.0, RadioState::Dch),
        ];
        assert_eq!(attribution_start(&intervals, 10.0), 8.0);
        assert_eq!(attribution_start(&intervals, 0.0), 0.0);
        assert_eq!(attribution_start(&intervals, 10.5), 10.5);
    }

    #[test]
    fn test_no_bursts_is_noop() {
        let profile = Profile::wifi();
        let mut bursts: Vec<Burst> = Vec::new();
        attribute(&profile, &mut bursts, 10.0);
        assert!(bursts.is_empty());
    }
}
