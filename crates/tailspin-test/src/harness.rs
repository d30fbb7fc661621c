//! Multi-seed pipeline harness
//!
//! Generates traces for several seeds and radio families, runs the analyzer
//! on each and collects invariant violations.

use tailspin_analysis::Analyzer;
use tailspin_core::{Profile, RadioFamily, TailspinResult};

use crate::generator::{GeneratorConfig, TraceGenerator};
use crate::invariants::check_report;

/// Harness configuration
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub generator: GeneratorConfig,
    /// Seeds to run, one trace per seed and family
    pub seeds: Vec<u64>,
    pub families: Vec<RadioFamily>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            generator: GeneratorConfig::default(),
            seeds: (0..8).collect(),
            families: RadioFamily::all().to_vec(),
        }
    }
}

impl HarnessConfig {
    /// A couple of small traces per family
    pub fn minimal() -> Self {
        HarnessConfig {
            generator: GeneratorConfig::light(),
            seeds: vec![1, 2],
            ..Self::default()
        }
    }

    pub fn stress() -> Self {
        HarnessConfig {
            generator: GeneratorConfig::chatty(),
            seeds: (0..32).collect(),
            ..Self::default()
        }
    }
}

/// Outcome of one harness run
#[derive(Clone, Debug, Default)]
pub struct HarnessResult {
    pub runs: usize,
    pub bursts: usize,
    /// Violations prefixed with family and seed
    pub violations: Vec<String>,
}

impl HarnessResult {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

pub struct PipelineHarness {
    config: HarnessConfig,
}

impl PipelineHarness {
    pub fn new(config: HarnessConfig) -> Self {
        PipelineHarness { config }
    }

    pub fn run(&self) -> TailspinResult<HarnessResult> {
        let mut result = HarnessResult::default();

        for &family in &self.config.families {
            let analyzer = Analyzer::new(Profile::for_family(family))?;
            for &seed in &self.config.seeds {
                let mut generator =
                    TraceGenerator::new(self.config.generator.clone().with_seed(seed));
                let trace = generator.trace(family)?;
                let report = analyzer.run(&trace)?;

                result.runs += 1;
                result.bursts += report.bursts.len();
                result.violations.extend(
                    check_report(&trace, &report)
                        .into_iter()
                        .map(|v| format!("{family} seed {seed}: {v}")),
                );
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_harness_passes() {
        let result = PipelineHarness::new(HarnessConfig::minimal()).run().unwrap();
        assert_eq!(result.runs, 6);
        assert!(result.bursts > 0);
        assert!(result.passed(), "{:?}", result.violations);
    }
}
