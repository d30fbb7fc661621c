//! End-to-end runs of the analysis pipeline for every radio family

use tailspin_analysis::{AnalysisReport, Analyzer};
use tailspin_core::{
    BurstCategory, Direction, Packet, PacketTimeline, Profile, RadioFamily, RadioState,
    StateInterval, TailspinError, Trace,
};
use tailspin_radio::FamilyRatios;
use tailspin_test::{
    check_report, keepalive, tap_then_download, tcp_cluster, GeneratorConfig, HarnessConfig,
    PipelineHarness, Scenario, TraceGenerator,
};

fn analyze(trace: &Trace) -> AnalysisReport {
    let report = Analyzer::new(Profile::for_family(trace.family()))
        .unwrap()
        .run(trace)
        .unwrap();
    let violations = check_report(trace, &report);
    assert!(violations.is_empty(), "{violations:?}");
    report
}

fn intervals_in(report: &AnalysisReport, state: RadioState) -> usize {
    report.statistics.get(state).map_or(0, |row| row.intervals)
}

#[test]
fn test_silent_trace_is_idle_for_every_family() {
    for family in RadioFamily::all() {
        let trace = Scenario::new(*family).duration(60.0).build().unwrap();
        let report = analyze(&trace);

        assert!(report.bursts.is_empty());
        assert_eq!(
            report.states,
            vec![StateInterval::new(0.0, 60.0, family.idle_state())]
        );
        assert_eq!(report.statistics.ratio(family.idle_state()), 1.0);
        assert_eq!(report.statistics.tail_ratio, 0.0);
        assert_eq!(report.statistics.promotion_ratio, 0.0);
        assert_eq!(report.statistics.total_energy, 0.0);
        assert_eq!(report.bursts.total_energy, 0.0);
    }
}

#[test]
fn test_zero_duration_trace() {
    let trace = Scenario::new(RadioFamily::Cellular3G).build().unwrap();
    let report = analyze(&trace);

    assert_eq!(report.states.len(), 1);
    assert_eq!(report.states[0].duration(), 0.0);
    assert!(report.statistics.states.iter().all(|row| row.ratio == 0.0));
    assert_eq!(report.statistics.total_energy, 0.0);
}

#[test]
fn test_single_umts_burst_tail() {
    let trace = Scenario::new(RadioFamily::Cellular3G)
        .burst(0.0, 3, 0.1, 500)
        .duration(10.0)
        .build()
        .unwrap();
    let report = analyze(&trace);

    assert_eq!(report.bursts.len(), 1);
    assert_eq!(
        report.states,
        vec![
            StateInterval::new(0.0, 0.2, RadioState::Dch),
            StateInterval::tail(0.2, 5.2, RadioState::Dch),
            StateInterval::tail(5.2, 10.0, RadioState::Fach),
        ]
    );
    match report.statistics.family_ratios {
        FamilyRatios::Umts { dch_tail_ratio, .. } => {
            assert!((dch_tail_ratio - 5.0 / 5.2).abs() < 1e-9);
        }
        other => panic!("unexpected ratios {other:?}"),
    }
}

#[test]
fn test_tcp_cluster_fails_multiple_connections() {
    for family in RadioFamily::all() {
        let report = analyze(&tcp_cluster(*family).unwrap());

        assert_eq!(report.bursts.len(), 4);
        assert_eq!(report.bursts.count(BurstCategory::TcpProtocolOnly), 4);
        assert_eq!(report.bursts.tightly_coupled_count, 4);
        assert!(!report.practices.multiple_tcp_connections_passed);
        assert!(report.practices.tcp_control_energy > 0.0);
    }
}

#[test]
fn test_keepalive_is_periodic() {
    for family in RadioFamily::all() {
        let report = analyze(&keepalive(*family, 6).unwrap());

        let categories: Vec<BurstCategory> =
            report.bursts.bursts().iter().map(|b| b.category).collect();
        assert_eq!(
            categories,
            vec![
                BurstCategory::Other,
                BurstCategory::Other,
                BurstCategory::Other,
                BurstCategory::Periodic,
                BurstCategory::Periodic,
                BurstCategory::Periodic,
            ]
        );
        assert_eq!(report.bursts.minimum_periodic_repeat_time, 10.0);
        assert!(!report.practices.periodic_transfer_passed);
    }
}

#[test]
fn test_keepalive_promotions_per_family() {
    // 10 s gaps: past the 3G DCH tail but inside FACH
    let umts = analyze(&keepalive(RadioFamily::Cellular3G, 6).unwrap());
    assert_eq!(intervals_in(&umts, RadioState::FachToDchPromotion), 5);
    assert_eq!(intervals_in(&umts, RadioState::IdleToDchPromotion), 0);

    // LTE stays in long DRX between keep-alives
    let lte = analyze(&keepalive(RadioFamily::CellularLte, 6).unwrap());
    assert_eq!(intervals_in(&lte, RadioState::IdleToCrPromotion), 0);
    assert_eq!(intervals_in(&lte, RadioState::LongDrx), 6);

    // WiFi drops to idle each time and never promotes
    let wifi = analyze(&keepalive(RadioFamily::Wifi, 6).unwrap());
    assert_eq!(wifi.statistics.promotion_ratio, 0.0);
    assert_eq!(intervals_in(&wifi, RadioState::WifiTail), 6);
}

#[test]
fn test_tap_then_download() {
    for family in RadioFamily::all() {
        let report = analyze(&tap_then_download(*family).unwrap());

        let categories: Vec<BurstCategory> =
            report.bursts.bursts().iter().map(|b| b.category).collect();
        assert_eq!(categories, vec![BurstCategory::UserInput, BurstCategory::LongBurst]);
        assert_eq!(report.bursts.long_burst_count, 1);
        assert_eq!(report.practices.user_input_burst_count, 1);
        assert_eq!(report.practices.largest_burst_time, 30.0);
        assert!(report.practices.wifi_offloading_passed);
    }
}

#[test]
fn test_screen_rotation_only_counted_once() {
    let trace = Scenario::new(RadioFamily::CellularLte)
        .burst(0.0, 2, 0.2, 800)
        .burst(10.0, 2, 0.2, 800)
        .burst(30.0, 2, 0.2, 800)
        .rotation(9.8)
        .rotation(29.9)
        .duration(45.0)
        .build()
        .unwrap();
    let report = analyze(&trace);

    assert_eq!(report.bursts.count(BurstCategory::ScreenRotation), 1);
    assert_eq!(report.practices.screen_rotation_burst_time, Some(10.0));
    assert!(!report.practices.screen_rotation_passed);
}

#[test]
fn test_burst_at_tail_expiry_has_no_promotion() {
    // 3G DCH tail is 5 s: the second burst lands exactly on expiry
    let trace = Scenario::new(RadioFamily::Cellular3G)
        .packet(Packet::data(0.0, Direction::Downlink, 500))
        .packet(Packet::data(5.0, Direction::Downlink, 500))
        .duration(8.0)
        .build()
        .unwrap();
    let report = analyze(&trace);

    assert_eq!(report.bursts.len(), 2);
    assert!(report.states.iter().all(|i| i.state == RadioState::Dch));
    assert_eq!(report.statistics.promotion_ratio, 0.0);
}

#[test]
fn test_family_mismatch_is_rejected() {
    let trace = Scenario::new(RadioFamily::Wifi)
        .burst(0.0, 2, 0.1, 100)
        .build()
        .unwrap();
    let err = Analyzer::new(Profile::umts()).unwrap().run(&trace).unwrap_err();

    assert!(matches!(
        err,
        TailspinError::FamilyMismatch {
            profile: RadioFamily::Cellular3G,
            trace: RadioFamily::Wifi,
        }
    ));
    assert!(err.is_configuration());
}

#[test]
fn test_trace_shorter_than_packets_is_rejected() {
    let timeline = PacketTimeline::new(vec![Packet::data(12.0, Direction::Uplink, 10)]).unwrap();
    let err = Trace::new(timeline, 10.0, RadioFamily::Wifi).unwrap_err();
    assert!(matches!(err, TailspinError::TraceTooShort { .. }));
}

#[test]
fn test_profile_loaded_from_json() {
    let profile = Profile::from_json(
        r#"{
            "name": "slow tail",
            "thresholds": { "burst_gap": 0.5 },
            "radio": { "family": "Umts", "dch_tail": 2.0 }
        }"#,
    )
    .unwrap();
    let trace = Scenario::new(RadioFamily::Cellular3G)
        .burst(0.0, 2, 1.0, 100)
        .duration(4.0)
        .build()
        .unwrap();

    let report = Analyzer::new(profile).unwrap().run(&trace).unwrap();
    // 1 s spacing exceeds the 0.5 s gap
    assert_eq!(report.bursts.len(), 2);
    assert_eq!(report.states.last().map(|i| i.state), Some(RadioState::Fach));
}

#[test]
fn test_report_serializes() {
    let report = analyze(&tap_then_download(RadioFamily::Wifi).unwrap());
    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value["states"].is_array());
    assert_eq!(value["statistics"]["family"], "Wifi");
}

#[test]
fn test_generated_traces_hold_invariants() {
    let result = PipelineHarness::new(HarnessConfig::default()).run().unwrap();
    assert_eq!(result.runs, 24);
    assert!(result.passed(), "{:?}", result.violations);
}

#[test]
fn test_chatty_app_clusters_tcp_bursts() {
    let trace = TraceGenerator::new(GeneratorConfig::chatty())
        .trace(RadioFamily::CellularLte)
        .unwrap();
    let report = analyze(&trace);

    assert!(report.bursts.count(BurstCategory::TcpProtocolOnly) > 0);
    assert!(report.bursts.tightly_coupled_count <= report.bursts.count(BurstCategory::TcpProtocolOnly));
}

#[test]
fn test_runs_are_deterministic() {
    let trace = TraceGenerator::new(GeneratorConfig::default().with_seed(99))
        .trace(RadioFamily::Cellular3G)
        .unwrap();
    let analyzer = Analyzer::new(Profile::umts()).unwrap();
    assert_eq!(analyzer.run(&trace).unwrap(), analyzer.run(&trace).unwrap());
}
