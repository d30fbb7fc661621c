//! Radio power-state simulation
//!
//! Replays a burst sequence against a family's [`StateTable`] and produces
//! the sequence of state intervals the radio went through. The output always
//! tiles `[0, duration]`: consecutive intervals share endpoints, the first one
//! starts at zero and the last one ends at the trace duration.
//!
//! Promotion delays are carved out of the low-power time preceding the burst,
//! so the active state always begins exactly at the burst begin time.

use tailspin_core::{Burst, Profile, RadioState, StateInterval};
use tracing::{debug, trace};

use crate::{Position, Promotion, StateTable};

/// Drives one family's transition table over a burst sequence
#[derive(Clone, Debug)]
pub struct RadioStateSimulator {
    table: StateTable,
}

impl RadioStateSimulator {
    pub fn new(table: StateTable) -> Self {
        RadioStateSimulator { table }
    }

    pub fn for_profile(profile: &Profile) -> Self {
        Self::new(StateTable::for_profile(profile))
    }

    pub fn table(&self) -> &StateTable {
        &self.table
    }

    /// Simulate the radio over `[0, duration]`.
    ///
    /// `bursts` must be sorted, non-overlapping and end no later than
    /// `duration`.
    pub fn simulate(&self, bursts: &[Burst], duration: f64) -> Vec<StateInterval> {
        let mut out = IntervalBuilder::default();
        let mut released: Option<f64> = None;

        for burst in bursts {
            let begin = burst.begin_time;
            let position = match released {
                Some(at) => self.table.position(at, begin),
                None => Position::Idle { since: 0.0 },
            };
            trace!(begin, ?position, "burst arrives");

            self.wake(&mut out, released, position, begin);
            out.push(StateInterval::new(begin, burst.end_time, self.table.active));
            released = Some(burst.end_time);
        }

        if let Some(at) = released {
            self.settle(&mut out, at, duration);
        }

        let intervals = out.finish(self.table.idle, duration);
        debug!(
            family = %self.table.family,
            bursts = bursts.len(),
            intervals = intervals.len(),
            "radio states simulated"
        );
        intervals
    }

    /// Emit everything between the previous release and `begin`
    fn wake(&self, out: &mut IntervalBuilder, released: Option<f64>, position: Position, begin: f64) {
        let (low, since, tail, promotion) = match position {
            Position::Ladder { stage, since } => {
                self.walk(out, released, stage);
                let rung = self.table.ladder[stage];
                (rung.state, since, true, rung.promotion)
            }
            Position::Idle { since } => {
                if released.is_some() {
                    self.walk(out, released, self.table.ladder.len());
                }
                (self.table.idle, since, false, self.table.idle_promotion)
            }
        };

        let low_end = match promotion {
            Some(Promotion { delay, .. }) => (begin - delay).max(since),
            None => begin,
        };
        out.push(StateInterval { start: since, end: low_end, state: low, tail });
        if let Some(Promotion { state, .. }) = promotion {
            out.push(StateInterval::new(low_end, begin, state));
        }
    }

    /// Emit the completed ladder rungs before rung `upto`
    fn walk(&self, out: &mut IntervalBuilder, released: Option<f64>, upto: usize) {
        let Some(mut since) = released else {
            return;
        };
        for rung in &self.table.ladder[..upto] {
            let deadline = since + rung.timer;
            out.push(StateInterval::tail(since, deadline, rung.state));
            since = deadline;
        }
    }

    /// Demote after the last burst until the trace ends
    fn settle(&self, out: &mut IntervalBuilder, released: f64, duration: f64) {
        let mut since = released;
        for rung in &self.table.ladder {
            let deadline = since + rung.timer;
            if duration <= deadline {
                out.push(StateInterval::tail(since, duration, rung.state));
                return;
            }
            out.push(StateInterval::tail(since, deadline, rung.state));
            since = deadline;
        }
        out.push(StateInterval::new(since, duration, self.table.idle));
    }
}

/// Collects intervals, dropping empty ones and merging contiguous equal ones
#[derive(Debug, Default)]
struct IntervalBuilder {
    intervals: Vec<StateInterval>,
}

impl IntervalBuilder {
    fn push(&mut self, interval: StateInterval) {
        if interval.end <= interval.start {
            return;
        }
        if let Some(last) = self.intervals.last_mut() {
            if last.state == interval.state && last.tail == interval.tail && last.end == interval.start {
                last.end = interval.end;
                return;
            }
        }
        self.intervals.push(interval);
    }

    /// Pad a silent trace with idle and pin the last endpoint to `duration`
    fn finish(mut self, idle: RadioState, duration: f64) -> Vec<StateInterval> {
        match self.intervals.last().map(|last| last.end) {
            None => self.intervals.push(StateInterval::new(0.0, duration, idle)),
            Some(end) if end < duration => self.push(StateInterval::new(end, duration, idle)),
            Some(_) => {}
        }
        self.intervals
    }
}
