// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cap_core::MeasurementId;

fn fix(timestamp_ms: u64, lat: f64, lon: f64) -> RawFix {
    RawFix { timestamp_ms, lat, lon, altitude_m: None, speed_mps: 1.0, horizontal_accuracy_m: Some(5.0), vertical_accuracy_m: None }
}

fn processor() -> GnssProcessor {
    GnssProcessor::new(DistanceStrategy::GreatCircle, CleaningStrategy::default(), DEFAULT_FIX_INACTIVITY_WINDOW_MS)
}

#[test]
fn first_fix_accumulates_zero_distance_and_reports_acquisition() {
    let mut p = processor();
    let registry = StrategyRegistry::new();
    let (outcome, transition) = p.process(&registry, MeasurementId::new(1), fix(0, 0.0, 0.0));

    assert!(matches!(outcome, GnssOutcome::Accepted { distance_delta_m, .. } if distance_delta_m == 0.0));
    assert_eq!(transition, Some(FixTransition::Acquired));
    assert_eq!(p.total_distance_m(), 0.0);

    // The edge only fires once; the second fix is not a transition.
    let (_, transition) = p.process(&registry, MeasurementId::new(1), fix(1_000, 0.0, 0.0));
    assert_eq!(transition, None);
}

#[test]
fn second_fix_accumulates_great_circle_distance() {
    let mut p = processor();
    let registry = StrategyRegistry::new();
    p.process(&registry, MeasurementId::new(1), fix(0, 0.0, 0.0));
    let (outcome, _) = p.process(&registry, MeasurementId::new(1), fix(1_000, 0.001, 0.0));

    match outcome {
        GnssOutcome::Accepted { distance_delta_m, .. } => assert!((distance_delta_m - 111.0).abs() < 0.5),
        _ => panic!("expected acceptance"),
    }
    assert!((p.total_distance_m() - 111.0).abs() < 0.5);
}

#[test]
fn out_of_range_fix_is_invalid_and_not_accumulated() {
    let mut p = processor();
    let registry = StrategyRegistry::new();
    let (outcome, _) = p.process(&registry, MeasurementId::new(1), fix(0, 200.0, 0.0));

    assert!(matches!(outcome, GnssOutcome::Invalid(_)));
    assert_eq!(p.total_distance_m(), 0.0);
}

#[test]
fn inaccurate_fix_is_rejected_but_not_invalid() {
    let mut p = processor();
    let registry = StrategyRegistry::new();
    let mut inaccurate = fix(0, 0.0, 0.0);
    inaccurate.horizontal_accuracy_m = Some(100.0);
    let (outcome, _) = p.process(&registry, MeasurementId::new(1), inaccurate);

    assert!(matches!(outcome, GnssOutcome::Rejected { .. }));
}

#[test]
fn inactivity_window_trips_lost_exactly_once() {
    let mut p = processor();
    let registry = StrategyRegistry::new();
    p.process(&registry, MeasurementId::new(1), fix(0, 0.0, 0.0));

    assert_eq!(p.check_inactivity(DEFAULT_FIX_INACTIVITY_WINDOW_MS - 1), None);
    assert_eq!(p.check_inactivity(DEFAULT_FIX_INACTIVITY_WINDOW_MS), Some(FixTransition::Lost));
    // Edge-triggered: staying lost doesn't re-fire.
    assert_eq!(p.check_inactivity(DEFAULT_FIX_INACTIVITY_WINDOW_MS + 5_000), None);
}

#[test]
fn fix_after_loss_reports_acquired_transition() {
    let mut p = processor();
    let registry = StrategyRegistry::new();
    p.process(&registry, MeasurementId::new(1), fix(0, 0.0, 0.0));
    p.check_inactivity(DEFAULT_FIX_INACTIVITY_WINDOW_MS);

    let (_, transition) = p.process(&registry, MeasurementId::new(1), fix(20_000, 0.0, 0.0));
    assert_eq!(transition, Some(FixTransition::Acquired));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // The running total always equals the pairwise strategy sum over the
        // accepted locations, within 1e-3 m per segment.
        #[test]
        fn running_total_matches_pairwise_sum(
            steps in proptest::collection::vec((-0.01f64..0.01, -0.01f64..0.01), 1..40),
        ) {
            let registry = StrategyRegistry::new();
            let mut p = processor();
            let id = MeasurementId::new(1);

            let (mut lat, mut lon, mut t) = (50.0, 8.0, 0u64);
            let mut accepted = Vec::new();
            for (dlat, dlon) in steps {
                lat += dlat;
                lon += dlon;
                t += 1_000;
                if let (GnssOutcome::Accepted { location, .. }, _) = p.process(&registry, id, fix(t, lat, lon)) {
                    accepted.push(location);
                }
            }

            let mut expected = 0.0;
            for pair in accepted.windows(2) {
                expected += DistanceStrategy::GreatCircle.compute(&registry, &pair[0], &pair[1]);
            }
            let tolerance = 1e-3 * accepted.len().max(1) as f64;
            prop_assert!((p.total_distance_m() - expected).abs() <= tolerance);
        }
    }
}
