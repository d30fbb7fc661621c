//! Invariant checks over a finished analysis report
//!
//! Each check returns the list of violations it found, empty when the
//! invariant holds.

use tailspin_analysis::AnalysisReport;
use tailspin_core::{Burst, BurstCategory, StateInterval, Trace};

/// Tolerance for float sums
pub const EPSILON: f64 = 1e-6;

/// Run every check
pub fn check_report(trace: &Trace, report: &AnalysisReport) -> Vec<String> {
    let mut violations = Vec::new();
    violations.extend(check_tiling(report.states.as_slice(), trace.duration()));
    violations.extend(check_bursts(report.bursts.bursts(), trace));
    violations.extend(check_ratios(report));
    violations.extend(check_energy(report));
    violations
}

/// Intervals are contiguous, non-empty and cover `[0, duration]`
pub fn check_tiling(intervals: &[StateInterval], duration: f64) -> Vec<String> {
    let mut violations = Vec::new();

    let (Some(first), Some(last)) = (intervals.first(), intervals.last()) else {
        return vec!["no state intervals".to_string()];
    };
    if first.start != 0.0 {
        violations.push(format!("first interval starts at {}", first.start));
    }
    if last.end != duration {
        violations.push(format!("last interval ends at {} not {duration}", last.end));
    }
    for (i, pair) in intervals.windows(2).enumerate() {
        if pair[0].end != pair[1].start {
            violations.push(format!(
                "gap between interval {i} ending {} and next starting {}",
                pair[0].end, pair[1].start
            ));
        }
    }
    if intervals.len() > 1 {
        for (i, interval) in intervals.iter().enumerate() {
            if interval.duration() <= 0.0 {
                violations.push(format!("interval {i} is empty"));
            }
        }
    }

    let covered: f64 = intervals.iter().map(StateInterval::duration).sum();
    if (covered - duration).abs() > EPSILON {
        violations.push(format!("intervals cover {covered} of {duration}"));
    }
    violations
}

/// Bursts partition the timeline in order without overlapping
pub fn check_bursts(bursts: &[Burst], trace: &Trace) -> Vec<String> {
    let mut violations = Vec::new();
    let packets = trace.timeline().packets();

    let mut next = 0;
    for (i, burst) in bursts.iter().enumerate() {
        if burst.packets.start != next {
            violations.push(format!(
                "burst {i} starts at packet {} not {next}",
                burst.packets.start
            ));
        }
        if burst.packets.is_empty() {
            violations.push(format!("burst {i} has no packets"));
            continue;
        }
        next = burst.packets.end;

        let members = burst.members(trace.timeline());
        if members.first().map(|p| p.timestamp) != Some(burst.begin_time)
            || members.last().map(|p| p.timestamp) != Some(burst.end_time)
        {
            violations.push(format!("burst {i} bounds disagree with its packets"));
        }
        if burst.category == BurstCategory::TcpProtocolOnly && members.iter().any(|p| !p.control_only)
        {
            violations.push(format!("burst {i} is TcpProtocolOnly but carries payload"));
        }
    }
    if next != packets.len() {
        violations.push(format!("bursts cover {next} of {} packets", packets.len()));
    }

    for (i, pair) in bursts.windows(2).enumerate() {
        if pair[0].end_time >= pair[1].begin_time {
            violations.push(format!("bursts {i} and {} overlap", i + 1));
        }
    }
    violations
}

/// Per-state ratios sum to one and every share of time is a fraction.
///
/// The promotion ratio is compared against active time and may exceed one.
pub fn check_ratios(report: &AnalysisReport) -> Vec<String> {
    let mut violations = Vec::new();
    let statistics = &report.statistics;

    let fractions = statistics
        .states
        .iter()
        .map(|row| (row.state.name(), row.ratio))
        .chain([("tail", statistics.tail_ratio)]);
    for (name, ratio) in fractions {
        if !(0.0..=1.0 + EPSILON).contains(&ratio) {
            violations.push(format!("{name} ratio {ratio} out of range"));
        }
    }

    if statistics.duration > 0.0 {
        let sum: f64 = statistics.states.iter().map(|row| row.ratio).sum();
        if (sum - 1.0).abs() > EPSILON {
            violations.push(format!("state ratios sum to {sum}"));
        }
    }
    if statistics.promotion_ratio < 0.0 {
        violations.push(format!("negative promotion ratio {}", statistics.promotion_ratio));
    }
    violations
}

/// Burst energy never exceeds radio energy and nothing is negative
pub fn check_energy(report: &AnalysisReport) -> Vec<String> {
    let mut violations = Vec::new();

    if report.bursts.total_energy > report.statistics.total_energy + EPSILON {
        violations.push(format!(
            "burst energy {} exceeds radio energy {}",
            report.bursts.total_energy, report.statistics.total_energy
        ));
    }
    for (i, burst) in report.bursts.bursts().iter().enumerate() {
        if burst.energy < 0.0 {
            violations.push(format!("burst {i} has negative energy {}", burst.energy));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailspin_core::RadioState;

    #[test]
    fn test_tiling_detects_gap() {
        let intervals = vec![
            StateInterval::new(0.0, 1.0, RadioState::Dch),
            StateInterval::new(1.5, 2.0, RadioState::Idle),
        ];
        let violations = check_tiling(&intervals, 2.0);
        assert!(violations.iter().any(|v| v.contains("gap")));
    }

    #[test]
    fn test_tiling_accepts_valid_sequence() {
        let intervals = vec![
            StateInterval::new(0.0, 1.0, RadioState::Dch),
            StateInterval::tail(1.0, 2.0, RadioState::Dch),
        ];
        assert!(check_tiling(&intervals, 2.0).is_empty());
    }

    #[test]
    fn test_tiling_rejects_empty_sequence() {
        assert_eq!(check_tiling(&[], 1.0).len(), 1);
    }
}
