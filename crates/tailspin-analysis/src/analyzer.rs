//! One analysis run over one trace

use tailspin_burst::{BurstClassifier, BurstCollection, BurstPractices, BurstSegmenter};
use tailspin_core::{Packet, PacketTimeline, Profile, TailspinError, TailspinResult, Trace};
use tailspin_radio::{attribute_energy, RadioStateSimulator, RadioStatistics, StateTable};
use tracing::{debug, info, info_span, warn};

use crate::AnalysisReport;

/// Runs the full pipeline for traces of the profile's radio family.
///
/// Holds no per-run state: independent runs may share one analyzer.
#[derive(Clone, Debug)]
pub struct Analyzer {
    profile: Profile,
    table: StateTable,
}

impl Analyzer {
    /// Validate `profile` and prepare its transition table
    pub fn new(profile: Profile) -> TailspinResult<Self> {
        profile.validate()?;
        let table = StateTable::for_profile(&profile);
        Ok(Analyzer { profile, table })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Segment, classify, simulate and reduce one trace
    pub fn run(&self, trace: &Trace) -> TailspinResult<AnalysisReport> {
        if trace.family() != self.profile.family() {
            return Err(TailspinError::FamilyMismatch {
                profile: self.profile.family(),
                trace: trace.family(),
            });
        }
        trace.validate()?;

        let span = info_span!(
            "analysis",
            family = %trace.family(),
            packets = trace.timeline().len()
        );
        let _enter = span.enter();

        let thresholds = &self.profile.thresholds;
        let timeline = trace.timeline();
        let duration = trace.duration();

        let segments = BurstSegmenter::from_thresholds(thresholds).segment(timeline);
        let mut classification =
            BurstClassifier::new(thresholds.clone()).classify(segments, timeline, trace.markers());

        let states = RadioStateSimulator::new(self.table.clone())
            .simulate(&classification.bursts, duration);
        let statistics =
            RadioStatistics::reduce(&self.table, &states, timeline, &self.profile, duration);

        attribute_energy(
            &mut classification.bursts,
            &states,
            timeline,
            &self.profile,
            duration,
        );
        let bursts = BurstCollection::assemble(classification, thresholds);
        let practices = BurstPractices::evaluate(&bursts);

        info!(
            bursts = bursts.len(),
            intervals = states.len(),
            total_energy = statistics.total_energy,
            burst_energy = bursts.total_energy,
            "analysis complete"
        );
        debug!(
            tail_ratio = statistics.tail_ratio,
            promotion_ratio = statistics.promotion_ratio,
            practices_passed = practices.all_passed(),
            "analysis summary"
        );

        Ok(AnalysisReport {
            bursts,
            states,
            statistics,
            practices,
        })
    }
}

/// Build a timeline from captured packets in arbitrary order.
///
/// Out-of-order captures are stable-sorted by timestamp rather than rejected.
pub fn timeline_from_capture(packets: Vec<Packet>) -> TailspinResult<PacketTimeline> {
    let count = packets.len();
    let (timeline, reordered) = PacketTimeline::normalized(packets)?;
    if reordered {
        warn!(packets = count, "capture was out of order, timeline sorted by timestamp");
    }
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailspin_core::{
        BurstCategory, BurstThresholds, Direction, RadioFamily, RadioState, UiEventMarkers,
    };

    fn data(t: f64) -> Packet {
        Packet::data(t, Direction::Downlink, 1_000)
    }

    fn trace(packets: Vec<Packet>, duration: f64, family: RadioFamily) -> Trace {
        Trace::new(PacketTimeline::new(packets).unwrap(), duration, family).unwrap()
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let profile = Profile::umts().with_thresholds(BurstThresholds {
            burst_gap: -1.0,
            ..BurstThresholds::default()
        });
        let err = Analyzer::new(profile).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_family_mismatch() {
        let analyzer = Analyzer::new(Profile::lte()).unwrap();
        let err = analyzer
            .run(&trace(vec![data(0.0)], 1.0, RadioFamily::Wifi))
            .unwrap_err();
        assert_eq!(
            err,
            TailspinError::FamilyMismatch {
                profile: RadioFamily::CellularLte,
                trace: RadioFamily::Wifi,
            }
        );
    }

    #[test]
    fn test_unsorted_trace_document_never_reaches_pipeline() {
        let document = r#"{
            "timeline": { "packets": [
                { "timestamp": 5.0, "direction": "Downlink", "length": 100, "control_only": false },
                { "timestamp": 1.0, "direction": "Downlink", "length": 100, "control_only": false }
            ] },
            "duration": 2.0,
            "family": "Cellular3G"
        }"#;
        assert!(matches!(
            Trace::from_json(document),
            Err(TailspinError::UnsortedTimeline { index: 1, .. })
        ));
        assert!(serde_json::from_str::<Trace>(document).is_err());
    }

    #[test]
    fn test_decoded_trace_runs_like_built_trace() {
        let built = trace(vec![data(0.0), data(0.2)], 10.0, RadioFamily::Cellular3G);
        let decoded = Trace::from_json(&serde_json::to_string(&built).unwrap()).unwrap();
        let analyzer = Analyzer::new(Profile::umts()).unwrap();
        assert_eq!(analyzer.run(&decoded).unwrap(), analyzer.run(&built).unwrap());
    }

    #[test]
    fn test_empty_trace() {
        let analyzer = Analyzer::new(Profile::umts()).unwrap();
        let report = analyzer
            .run(&trace(vec![], 60.0, RadioFamily::Cellular3G))
            .unwrap();

        assert!(report.bursts.is_empty());
        assert_eq!(report.states.len(), 1);
        assert_eq!(report.states[0].state, RadioState::Idle);
        assert_eq!(report.statistics.ratio(RadioState::Idle), 1.0);
        assert_eq!(report.bursts.total_energy, 0.0);
        assert_eq!(report.statistics.total_energy, 0.0);
        assert!(report.practices.all_passed());
    }

    #[test]
    fn test_single_burst_report() {
        let analyzer = Analyzer::new(Profile::umts()).unwrap();
        let report = analyzer
            .run(&trace(vec![data(0.0), data(0.2)], 10.0, RadioFamily::Cellular3G))
            .unwrap();

        assert_eq!(report.bursts.len(), 1);
        assert_eq!(report.bursts.bursts()[0].category, BurstCategory::Other);
        assert_eq!(report.states.len(), 3);
        assert!((report.bursts.total_energy - report.statistics.total_energy).abs() < 1e-9);
        assert_eq!(report.family(), RadioFamily::Cellular3G);
        assert_eq!(report.duration(), 10.0);
    }

    #[test]
    fn test_markers_flow_through() {
        let analyzer = Analyzer::new(Profile::wifi()).unwrap();
        let trace = trace(vec![data(5.0), data(5.3)], 20.0, RadioFamily::Wifi)
            .with_markers(UiEventMarkers::new(vec![], vec![4.5]));
        let report = analyzer.run(&trace).unwrap();

        assert_eq!(report.bursts.count(BurstCategory::UserInput), 1);
        assert_eq!(report.practices.user_input_burst_count, 1);
    }

    #[test]
    fn test_timeline_from_capture_sorts() {
        let timeline = timeline_from_capture(vec![data(2.0), data(1.0), data(3.0)]).unwrap();
        let times: Vec<f64> = timeline.packets().iter().map(|p| p.timestamp).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);

        assert!(timeline_from_capture(vec![data(f64::NAN)]).is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_burst_energy_bounded_by_radio_energy(
            mut times in proptest::collection::vec(0.0f64..300.0, 0..60),
            tail in 0.0f64..30.0,
        ) {
            times.sort_by(f64::total_cmp);
            let duration = times.last().copied().unwrap_or(0.0) + tail;
            let packets = times.into_iter().map(data).collect();
            let analyzer = Analyzer::new(Profile::lte()).unwrap();

            let trace = trace(packets, duration, RadioFamily::CellularLte);

            let report = analyzer.run(&trace).unwrap();
            proptest::prop_assert!(report.bursts.total_energy <= report.statistics.total_energy + 1e-9);
            proptest::prop_assert_eq!(report, analyzer.run(&trace).unwrap());
        }
    }
}
