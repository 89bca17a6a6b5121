//! End-to-end scenarios over synthetic gait signals.

use std::f64::consts::PI;

use stridelab_gait_model::gait::{PairingSide, SymmetryMethod};
use stridelab_gait_model::record::{ImuSample, StepRecord};
use stridelab_processing_core::gait_events::{GaitDetectorConfig, GaitEventDetector};
use stridelab_processing_core::gsi::{GsiConfig, GsiEstimator};
use stridelab_processing_core::merge::LeftRightMerger;
use stridelab_processing_core::pipeline::alternate_feet;
use stridelab_processing_core::stats::mean;
use stridelab_processing_core::symmetry::SymmetryCalculator;

const SAMPLE_PERIOD_NS: i64 = 10_000_000;

/// 1.5 Hz vertical acceleration at 100 Hz. Every second trough is 1.5x
/// deeper, so alternate steps land harder.
fn limping_run(seconds: f64) -> Vec<ImuSample> {
    let n = (seconds * 100.0) as i64;
    (0..n)
        .map(|i| {
            let t = i as f64 / 100.0;
            let mut v = (2.0 * PI * 1.5 * t).sin();
            if v < 0.0 && ((1.5 * t - 0.5).floor() as i64).rem_euclid(2) == 1 {
                v *= 1.5;
            }
            ImuSample {
                timestamp_ns: i * SAMPLE_PERIOD_NS,
                ax: 0.0,
                ay: 0.0,
                az: 0.0,
                a_vert: v,
            }
        })
        .collect()
}

fn detector() -> GaitEventDetector {
    GaitEventDetector::new(GaitDetectorConfig {
        contact_time_range_ms: [100.0, 400.0],
        step_time_range_ms: [200.0, 1000.0],
        peak_prominence: 1.5,
    })
    .unwrap()
}

#[test]
fn limping_run_has_steady_cadence() {
    let detection = detector().detect_imu(&limping_run(10.0)).unwrap();

    assert!(detection.cycles.len() >= 10, "{} cycles", detection.cycles.len());
    for cycle in &detection.cycles {
        assert!((cycle.cadence - 90.0).abs() < 1.5, "cadence {}", cycle.cadence);
        assert!((cycle.contact_time_ms - 333.0).abs() < 15.0);
        assert!(cycle.flight_ratio > 0.0 && cycle.flight_ratio < 1.0);
    }
}

#[test]
fn limping_run_is_asymmetric_in_impact() {
    let detection = detector().detect_imu(&limping_run(10.0)).unwrap();
    let steps = alternate_feet(&detection.cycles, ["A", "B"]);

    let mut merged = LeftRightMerger::new("A", "B").merge(&steps);
    let good = merged.iter().filter(|m| !m.bad_half_step).count();
    assert!(good >= detection.cycles.len() - 2);

    let features = vec!["impact".to_string()];
    SymmetryCalculator::new(SymmetryMethod::Sa).apply(&mut merged, Some(features.as_slice()));

    let sa: Vec<f64> = merged
        .iter()
        .filter(|m| !m.bad_half_step)
        .map(|m| m.column("impact_sa"))
        .collect();
    let magnitude = mean(&sa.iter().map(|v| v.abs()).collect::<Vec<_>>());
    assert!(
        (magnitude - 0.1257).abs() < 0.03,
        "mean |sa| = {magnitude}"
    );
    // Step timing alternates evenly, so its asymmetry stays near zero.
    let features = vec!["step_duration".to_string()];
    SymmetryCalculator::new(SymmetryMethod::Sa).apply(&mut merged, Some(features.as_slice()));
    for row in merged.iter().filter(|m| !m.bad_half_step) {
        assert!(row.column("step_duration_sa").abs() < 0.02);
    }
}

#[test]
fn missing_foot_leaves_only_half_steps() {
    let steps: Vec<StepRecord> = (0..10)
        .map(|i| StepRecord::new(i * 700_000_000, "left").with_metric("impact", 10.0))
        .collect();
    let merged = LeftRightMerger::new("left", "right")
        .with_side(PairingSide::Both)
        .merge(&steps);

    assert_eq!(merged.len(), 10);
    assert!(merged.iter().all(|m| m.bad_half_step));
    assert!(merged.iter().all(|m| m.column("impact_right").is_nan()));
}

#[test]
fn gsi_of_periodic_signal() {
    let samples: Vec<ImuSample> = (0..1000)
        .map(|i| {
            let t = i as f64 / 100.0;
            let phase = 2.0 * PI * t;
            ImuSample {
                timestamp_ns: i * SAMPLE_PERIOD_NS,
                ax: phase.sin(),
                ay: (phase + 1.0).sin(),
                az: phase.cos(),
                a_vert: phase.sin(),
            }
        })
        .collect();

    let estimator = GsiEstimator::new(GsiConfig::default()).unwrap();
    let estimate = estimator.estimate_imu(&samples);

    assert!(
        (estimate.stride_duration_secs - 1.0).abs() <= 0.011,
        "stride {}",
        estimate.stride_duration_secs
    );
    assert!(estimate.gsi >= -0.05 && estimate.gsi <= 1.05, "gsi {}", estimate.gsi);
    assert!((estimate.cadence() - 120.0).abs() < 1.5);
}
