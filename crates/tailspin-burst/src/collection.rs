//! Aggregate view over classified bursts

use serde::{Deserialize, Serialize};
use tailspin_core::{Burst, BurstCategory, BurstThresholds};
use tracing::debug;

use crate::Classification;

/// Classified bursts and the scalars downstream rules consume
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BurstCollection {
    bursts: Vec<Burst>,
    /// TcpProtocolOnly bursts that sit in a cluster within the rolling window
    pub tightly_coupled_count: usize,
    pub long_burst_count: usize,
    /// Shortest periodic repeat cycle, 0.0 when none was found
    pub minimum_periodic_repeat_time: f64,
    /// Sum of all burst energies (joules)
    pub total_energy: f64,
    /// Longest run of consecutive UserInput bursts
    pub user_input_burst_count: usize,
    /// Begin time of the first screen-rotation burst
    pub screen_rotation_burst_time: Option<f64>,
}

impl BurstCollection {
    /// Build the collection from a classification pass.
    ///
    /// Burst energies must already be attributed.
    pub fn assemble(classification: Classification, thresholds: &BurstThresholds) -> Self {
        let Classification {
            bursts,
            periodicity,
            state,
        } = classification;

        let tightly_coupled_count = tightly_coupled_count(
            &bursts,
            thresholds.tcp_cluster_window,
            thresholds.tcp_cluster_size,
        );
        let long_burst_count = bursts
            .iter()
            .filter(|b| b.category == BurstCategory::LongBurst)
            .count();
        let total_energy = bursts.iter().map(|b| b.energy).sum();

        let collection = BurstCollection {
            bursts,
            tightly_coupled_count,
            long_burst_count,
            minimum_periodic_repeat_time: periodicity.minimum_repeat_time,
            total_energy,
            user_input_burst_count: state.max_user_input_run,
            screen_rotation_burst_time: state.rotation_burst_time,
        };

        debug!(
            bursts = collection.len(),
            tightly_coupled = collection.tightly_coupled_count,
            long = collection.long_burst_count,
            total_energy = collection.total_energy,
            "burst collection assembled"
        );
        collection
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    pub fn len(&self) -> usize {
        self.bursts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }

    /// Number of bursts in a category
    pub fn count(&self, category: BurstCategory) -> usize {
        self.bursts.iter().filter(|b| b.category == category).count()
    }

    /// Burst counts for every category, in declaration order
    pub fn counts(&self) -> Vec<(BurstCategory, usize)> {
        BurstCategory::all()
            .iter()
            .map(|&category| (category, self.count(category)))
            .collect()
    }

    /// Energy of all bursts in a category
    pub fn energy_of(&self, category: BurstCategory) -> f64 {
        self.bursts
            .iter()
            .filter(|b| b.category == category)
            .map(|b| b.energy)
            .sum()
    }
}

/// Count TcpProtocolOnly bursts that fall in some window of `window` seconds
/// holding at least `cluster_size` of them.
pub fn tightly_coupled_count(bursts: &[Burst], window: f64, cluster_size: usize) -> usize {
    let times: Vec<f64> = bursts
        .iter()
        .filter(|b| b.category == BurstCategory::TcpProtocolOnly)
        .map(|b| b.begin_time)
        .collect();

    let mut clustered = vec![false; times.len()];
    let mut end = 0;
    for start in 0..times.len() {
        end = end.max(start);
        while end + 1 < times.len() && times[end + 1] - times[start] <= window {
            end += 1;
        }
        if end + 1 - start >= cluster_size {
            clustered[start..=end].iter_mut().for_each(|c| *c = true);
        }
    }

    clustered.into_iter().filter(|&c| c).count()
}
