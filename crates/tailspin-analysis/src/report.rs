//! Result of one analysis run

use serde::{Deserialize, Serialize};
use tailspin_burst::{BurstCollection, BurstPractices};
use tailspin_core::{BurstCategory, RadioFamily, StateInterval};
use tailspin_radio::RadioStatistics;

/// Everything one run produced. Never mutated after the run returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub bursts: BurstCollection,
    /// Tiles `[0, duration]`
    pub states: Vec<StateInterval>,
    pub statistics: RadioStatistics,
    pub practices: BurstPractices,
}

impl AnalysisReport {
    pub fn family(&self) -> RadioFamily {
        self.statistics.family
    }

    pub fn duration(&self) -> f64 {
        self.statistics.duration
    }

    /// One line per burst category: count and energy
    pub fn category_summary(&self) -> Vec<CategorySummary> {
        BurstCategory::all()
            .iter()
            .map(|&category| CategorySummary {
                category,
                count: self.bursts.count(category),
                energy: self.bursts.energy_of(category),
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: BurstCategory,
    pub count: usize,
    pub energy: f64,
}
