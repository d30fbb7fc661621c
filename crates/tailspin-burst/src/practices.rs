//! Burst-level best-practice signals
//!
//! Pass/fail verdicts and supporting figures derived purely from a finished
//! [`BurstCollection`]. Content-level checks (caching, compression, images)
//! belong to other collaborators.

use serde::{Deserialize, Serialize};
use tailspin_core::BurstCategory;

use crate::BurstCollection;

/// Clustered TCP control bursts at or above this count fail the check
pub const MULTIPLE_TCP_CONNECTIONS_LIMIT: usize = 4;
/// Consecutive user-input bursts at or above this count indicate missed prefetching
pub const PREFETCH_RUN_LIMIT: usize = 5;
/// More long bursts than this suggest the transfer belongs on WiFi
pub const WIFI_OFFLOAD_LONG_BURST_LIMIT: usize = 3;
/// Share of burst energy spent on TCP control bursts at which connection closing fails
pub const CONNECTION_CLOSING_ENERGY_LIMIT: f64 = 0.05;

/// Burst-derived best-practice results
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BurstPractices {
    /// Energy spent on payload-free TCP bursts (joules)
    pub tcp_control_energy: f64,
    /// `tcp_control_energy` over total burst energy
    pub tcp_control_energy_ratio: f64,
    /// Begin time of the most expensive TCP control burst, 0.0 when none drew energy
    pub largest_tcp_energy_time: f64,
    /// Begin time of the longest burst
    pub largest_burst_time: f64,
    pub screen_rotation_burst_time: Option<f64>,
    pub user_input_burst_count: usize,

    pub connection_closing_passed: bool,
    pub multiple_tcp_connections_passed: bool,
    pub periodic_transfer_passed: bool,
    pub screen_rotation_passed: bool,
    pub prefetching_passed: bool,
    pub wifi_offloading_passed: bool,
}

impl BurstPractices {
    pub fn evaluate(collection: &BurstCollection) -> Self {
        let mut largest_burst: Option<(f64, f64)> = None;
        // (energy, begin); only a burst drawing energy can claim it
        let mut most_expensive_tcp = (0.0, 0.0);
        let mut tcp_control_energy = 0.0;

        for burst in collection.bursts() {
            let duration = burst.duration();
            if largest_burst.map_or(true, |(d, _)| duration > d) {
                largest_burst = Some((duration, burst.begin_time));
            }

            if burst.category == BurstCategory::TcpProtocolOnly {
                tcp_control_energy += burst.energy;
                if burst.energy > most_expensive_tcp.0 {
                    most_expensive_tcp = (burst.energy, burst.begin_time);
                }
            }
        }

        let tcp_control_energy_ratio = if collection.total_energy > 0.0 {
            tcp_control_energy / collection.total_energy
        } else {
            0.0
        };

        BurstPractices {
            tcp_control_energy,
            tcp_control_energy_ratio,
            largest_tcp_energy_time: most_expensive_tcp.1,
            largest_burst_time: largest_burst.map_or(0.0, |(_, t)| t),
            screen_rotation_burst_time: collection.screen_rotation_burst_time,
            user_input_burst_count: collection.user_input_burst_count,
            connection_closing_passed: tcp_control_energy_ratio < CONNECTION_CLOSING_ENERGY_LIMIT,
            multiple_tcp_connections_passed: collection.tightly_coupled_count
                < MULTIPLE_TCP_CONNECTIONS_LIMIT,
            periodic_transfer_passed: collection.minimum_periodic_repeat_time == 0.0,
            screen_rotation_passed: collection.screen_rotation_burst_time.is_none(),
            prefetching_passed: collection.user_input_burst_count < PREFETCH_RUN_LIMIT,
            wifi_offloading_passed: collection.long_burst_count <= WIFI_OFFLOAD_LONG_BURST_LIMIT,
        }
    }

    /// Every verdict passed
    pub fn all_passed(&self) -> bool {
        self.connection_closing_passed
            && self.multiple_tcp_connections_passed
            && self.periodic_transfer_passed
            && self.screen_rotation_passed
            && self.prefetching_passed
            && self.wifi_offloading_passed
    }
}
