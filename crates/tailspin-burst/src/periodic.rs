//! Periodic transfer detection
//!
//! A burst is periodic when it continues a chain of earlier bursts spaced one
//! cycle apart. The cycle is taken from the gap to some earlier burst and must
//! lie in `[min_cycle, min_cycle + tolerance]`; each earlier link of the chain
//! may deviate from the ideal position by at most `tolerance`.

use tailspin_core::BurstThresholds;
use tracing::{debug, trace};

/// Result of periodicity detection over a burst sequence
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Periodicity {
    /// Detected cycle per burst, `None` when the burst repeats nothing
    pub cycles: Vec<Option<f64>>,
    /// Shortest detected cycle, 0.0 when no pattern was found
    pub minimum_repeat_time: f64,
}

impl Periodicity {
    pub fn cycle(&self, index: usize) -> Option<f64> {
        self.cycles.get(index).copied().flatten()
    }

    pub fn found(&self) -> bool {
        self.minimum_repeat_time > 0.0
    }
}

/// Detects repeating burst start times
#[derive(Clone, Copy, Debug)]
pub struct PeriodicityDetector {
    min_cycle: f64,
    tolerance: f64,
    min_samples: usize,
}

impl PeriodicityDetector {
    pub fn new(min_cycle: f64, tolerance: f64, min_samples: usize) -> Self {
        PeriodicityDetector {
            min_cycle,
            tolerance,
            min_samples: min_samples.max(1),
        }
    }

    pub fn from_thresholds(thresholds: &BurstThresholds) -> Self {
        Self::new(
            thresholds.period_min_cycle,
            thresholds.period_cycle_tolerance,
            thresholds.period_min_samples,
        )
    }

    /// Run detection over ascending burst begin times
    pub fn detect(&self, begin_times: &[f64]) -> Periodicity {
        let cycles: Vec<Option<f64>> = (0..begin_times.len())
            .map(|index| self.cycle_at(begin_times, index))
            .collect();

        let minimum_repeat_time = cycles
            .iter()
            .flatten()
            .copied()
            .fold(None, |min: Option<f64>, c| Some(min.map_or(c, |m| m.min(c))))
            .unwrap_or(0.0);

        debug!(
            bursts = begin_times.len(),
            periodic = cycles.iter().filter(|c| c.is_some()).count(),
            minimum_repeat_time,
            "periodicity detected"
        );

        Periodicity {
            cycles,
            minimum_repeat_time,
        }
    }

    /// Cycle that burst `index` continues, if any.
    ///
    /// Candidate cycles are tried from the nearest predecessor outward, so the
    /// shortest qualifying cycle wins.
    fn cycle_at(&self, times: &[f64], index: usize) -> Option<f64> {
        let t = times[index];
        let max_cycle = self.min_cycle + self.tolerance;

        for anchor in (0..index).rev() {
            let cycle = t - times[anchor];
            if cycle < self.min_cycle {
                continue;
            }
            if cycle > max_cycle {
                break;
            }

            if let Some(first) = self.chain_start(times, anchor, cycle) {
                let average = (t - times[first]) / self.min_samples as f64;
                trace!(index, cycle = average, "periodic burst");
                return Some(average);
            }
        }
        None
    }

    /// Walk back from `anchor` one cycle at a time. Returns the index of the
    /// earliest chain member once `min_samples` prior bursts are found.
    fn chain_start(&self, times: &[f64], anchor: usize, cycle: f64) -> Option<usize> {
        let mut samples = 1;
        let mut current = anchor;

        while samples < self.min_samples {
            let target = times[current] - cycle;
            current = nearest_within(&times[..current], target, self.tolerance)?;
            samples += 1;
        }
        Some(current)
    }
}

/// Index of the element of ascending `times` closest to `target`, if it is
/// within `tolerance`.
fn nearest_within(times: &[f64], target: f64, tolerance: f64) -> Option<usize> {
    let split = times.partition_point(|&t| t < target);

    let below = split.checked_sub(1);
    let above = (split < times.len()).then_some(split);

    let best = match (below, above) {
        (Some(b), Some(a)) => {
            if target - times[b] <= times[a] - target {
                b
            } else {
                a
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    ((times[best] - target).abs() <= tolerance).then_some(best)
}
