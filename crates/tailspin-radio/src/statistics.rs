//! Per-state time, ratio and energy statistics

use serde::{Deserialize, Serialize};
use tailspin_core::{EnergyModel, PacketTimeline, RadioFamily, RadioState, StateInterval};
use tracing::debug;

use crate::StateTable;

/// Totals for one radio state
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateStatistics {
    pub state: RadioState,
    /// Seconds spent in the state
    pub seconds: f64,
    /// `seconds` over the trace duration
    pub ratio: f64,
    /// Joules spent in the state
    pub energy: f64,
    /// Part of `seconds` spent waiting on an inactivity timer
    pub tail_seconds: f64,
    /// Number of separate visits
    pub intervals: usize,
}

impl StateStatistics {
    fn empty(state: RadioState) -> Self {
        StateStatistics {
            state,
            seconds: 0.0,
            ratio: 0.0,
            energy: 0.0,
            tail_seconds: 0.0,
            intervals: 0,
        }
    }
}

/// Ratios only meaningful for one family
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family")]
pub enum FamilyRatios {
    Umts {
        /// DCH tail over all DCH time
        dch_tail_ratio: f64,
        /// FACH tail over all FACH time
        fach_tail_ratio: f64,
    },
    Lte {
        /// CR tail over CR plus CR tail
        cr_tail_ratio: f64,
        /// Short DRX over all DRX time
        short_drx_ratio: f64,
        /// Long DRX over all DRX time
        long_drx_ratio: f64,
    },
    Wifi {
        active_ratio: f64,
        tail_ratio: f64,
        idle_ratio: f64,
    },
}

/// Reduction of one simulation run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadioStatistics {
    pub family: RadioFamily,
    pub duration: f64,
    /// One row per state of the family, highest power first
    pub states: Vec<StateStatistics>,
    pub total_energy: f64,
    /// Tail after traffic over tail plus active transfer time
    pub tail_ratio: f64,
    /// Promotion time over active-state time
    pub promotion_ratio: f64,
    pub family_ratios: FamilyRatios,
}

impl RadioStatistics {
    /// Reduce a simulated interval sequence.
    ///
    /// Energy per interval comes from `model`, fed with the packets observed
    /// in that interval. All ratios are zero for a zero-duration trace.
    pub fn reduce<M: EnergyModel + ?Sized>(
        table: &StateTable,
        intervals: &[StateInterval],
        timeline: &PacketTimeline,
        model: &M,
        duration: f64,
    ) -> Self {
        let family = table.family;
        let mut states: Vec<StateStatistics> = family
            .states()
            .iter()
            .map(|&state| StateStatistics::empty(state))
            .collect();

        let mut total_energy = 0.0;
        for interval in intervals {
            let Some(row) = states.iter_mut().find(|row| row.state == interval.state) else {
                continue;
            };
            let seconds = interval.duration();
            let energy = model.energy(
                interval.start,
                interval.end,
                interval.state,
                timeline.packets_between(interval.start, interval.end),
            );

            row.seconds += seconds;
            row.energy += energy;
            row.intervals += 1;
            if interval.tail {
                row.tail_seconds += seconds;
            }
            total_energy += energy;
        }

        for row in &mut states {
            row.ratio = ratio(row.seconds, duration);
        }

        let lookup = |state: RadioState| {
            states
                .iter()
                .find(|row| row.state == state)
                .copied()
                .unwrap_or_else(|| StateStatistics::empty(state))
        };

        let active = lookup(table.active);
        let transfer = active.seconds - active.tail_seconds;
        let tail = table
            .first_tail()
            .map_or(0.0, |state| lookup(state).tail_seconds);
        let promotion: f64 = states
            .iter()
            .filter(|row| row.state.is_promotion())
            .map(|row| row.seconds)
            .sum();

        let family_ratios = match family {
            RadioFamily::Cellular3G => {
                let dch = lookup(RadioState::Dch);
                let fach = lookup(RadioState::Fach);
                FamilyRatios::Umts {
                    dch_tail_ratio: ratio(dch.tail_seconds, dch.seconds),
                    fach_tail_ratio: ratio(fach.tail_seconds, fach.seconds),
                }
            }
            RadioFamily::CellularLte => {
                let cr = lookup(RadioState::ContinuousReception);
                let cr_tail = lookup(RadioState::ContinuousReceptionTail);
                let short = lookup(RadioState::ShortDrx);
                let long = lookup(RadioState::LongDrx);
                let drx = short.seconds + long.seconds;
                FamilyRatios::Lte {
                    cr_tail_ratio: ratio(cr_tail.seconds, cr.seconds + cr_tail.seconds),
                    short_drx_ratio: ratio(short.seconds, drx),
                    long_drx_ratio: ratio(long.seconds, drx),
                }
            }
            RadioFamily::Wifi => FamilyRatios::Wifi {
                active_ratio: lookup(RadioState::WifiActive).ratio,
                tail_ratio: lookup(RadioState::WifiTail).ratio,
                idle_ratio: lookup(RadioState::WifiIdle).ratio,
            },
        };

        let statistics = RadioStatistics {
            family,
            duration,
            total_energy,
            tail_ratio: ratio(tail, tail + transfer),
            promotion_ratio: ratio(promotion, active.seconds),
            family_ratios,
            states,
        };
        debug!(
            family = %family,
            total_energy = statistics.total_energy,
            tail_ratio = statistics.tail_ratio,
            promotion_ratio = statistics.promotion_ratio,
            "radio statistics reduced"
        );
        statistics
    }

    pub fn get(&self, state: RadioState) -> Option<&StateStatistics> {
        self.states.iter().find(|row| row.state == state)
    }

    pub fn seconds(&self, state: RadioState) -> f64 {
        self.get(state).map_or(0.0, |row| row.seconds)
    }

    pub fn ratio(&self, state: RadioState) -> f64 {
        self.get(state).map_or(0.0, |row| row.ratio)
    }

    pub fn energy(&self, state: RadioState) -> f64 {
        self.get(state).map_or(0.0, |row| row.energy)
    }

    /// Seconds in promotion states
    pub fn promotion_seconds(&self) -> f64 {
        self.states
            .iter()
            .filter(|row| row.state.is_promotion())
            .map(|row| row.seconds)
            .sum()
    }
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RadioStateSimulator;
    use tailspin_core::{Burst, Direction, Packet, Profile};

    fn burst(begin: f64, end: f64) -> Burst {
        Burst::new(begin, end, 0..1, 100)
    }

    fn run(profile: &Profile, bursts: &[Burst], duration: f64) -> RadioStatistics {
        let table = StateTable::for_profile(profile);
        let intervals = RadioStateSimulator::new(table.clone()).simulate(bursts, duration);
        RadioStatistics::reduce(&table, &intervals, &PacketTimeline::empty(), profile, duration)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_ratios_sum_to_one() {
        for profile in [Profile::umts(), Profile::lte(), Profile::wifi()] {
            let stats = run(&profile, &[burst(3.0, 4.0), burst(20.0, 26.0)], 60.0);
            let sum: f64 = stats.states.iter().map(|row| row.ratio).sum();
            assert_close(sum, 1.0);
            assert_eq!(stats.states.len(), profile.family().states().len());
        }
    }

    #[test]
    fn test_zero_duration_has_zero_ratios() {
        let stats = run(&Profile::umts(), &[], 0.0);
        assert!(stats.states.iter().all(|row| row.ratio == 0.0));
        assert_eq!(stats.tail_ratio, 0.0);
        assert_eq!(stats.promotion_ratio, 0.0);
        assert_eq!(stats.total_energy, 0.0);
    }

    #[test]
    fn test_umts_single_burst() {
        let stats = run(&Profile::umts(), &[burst(0.0, 0.2)], 10.0);

        assert_close(stats.seconds(RadioState::Dch), 5.2);
        assert_close(stats.seconds(RadioState::Fach), 4.8);
        assert_close(stats.ratio(RadioState::Dch), 0.52);
        assert_close(stats.tail_ratio, 5.0 / 5.2);
        assert_eq!(stats.promotion_ratio, 0.0);

        // 0.8 W for 5.2 s plus 0.46 W for 4.8 s
        assert_close(stats.total_energy, 0.8 * 5.2 + 0.46 * 4.8);
        assert_close(stats.energy(RadioState::Fach), 0.46 * 4.8);

        match stats.family_ratios {
            FamilyRatios::Umts {
                dch_tail_ratio,
                fach_tail_ratio,
            } => {
                assert_close(dch_tail_ratio, 5.0 / 5.2);
                assert_close(fach_tail_ratio, 1.0);
            }
            other => panic!("unexpected ratios {other:?}"),
        }
    }

    #[test]
    fn test_promotion_ratio() {
        let stats = run(&Profile::umts(), &[burst(10.0, 11.0)], 20.0);
        // 2 s promotion against 1 s transfer plus 5 s tail
        assert_close(stats.promotion_seconds(), 2.0);
        assert_close(stats.promotion_ratio, 2.0 / 6.0);
        assert_eq!(stats.get(RadioState::IdleToDchPromotion).map(|r| r.intervals), Some(1));
    }

    #[test]
    fn test_lte_drx_split() {
        let stats = run(&Profile::lte(), &[burst(0.0, 1.0)], 20.0);

        match stats.family_ratios {
            FamilyRatios::Lte {
                cr_tail_ratio,
                short_drx_ratio,
                long_drx_ratio,
            } => {
                assert_close(cr_tail_ratio, 0.1 / 1.1);
                assert_close(short_drx_ratio, 0.4 / 11.4);
                assert_close(long_drx_ratio, 11.0 / 11.4);
                assert_close(short_drx_ratio + long_drx_ratio, 1.0);
            }
            other => panic!("unexpected ratios {other:?}"),
        }
        assert_close(stats.tail_ratio, 0.1 / 1.1);
    }

    #[test]
    fn test_wifi_active_energy_uses_throughput() {
        let profile = Profile::wifi();
        let table = StateTable::for_profile(&profile);
        let packets = vec![
            Packet::data(0.0, Direction::Downlink, 125_000),
            Packet::data(0.5, Direction::Uplink, 125_000),
        ];
        let timeline = PacketTimeline::new(packets).unwrap();
        let intervals = RadioStateSimulator::new(table.clone()).simulate(&[burst(0.0, 1.0)], 1.0);

        let stats = RadioStatistics::reduce(&table, &intervals, &timeline, &profile, 1.0);
        // 1 Mbit each way over one second
        assert_close(stats.energy(RadioState::WifiActive), 0.403 + 0.283 + 0.137);
        match stats.family_ratios {
            FamilyRatios::Wifi { active_ratio, idle_ratio, .. } => {
                assert_close(active_ratio, 1.0);
                assert_eq!(idle_ratio, 0.0);
            }
            other => panic!("unexpected ratios {other:?}"),
        }
    }
}
