// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_measurement_starts_open_with_zero_distance() {
    let m = Measurement::new(MeasurementId::new(1), Modality::Bicycle, 1, 1_000);
    assert_eq!(m.status, MeasurementStatus::Open);
    assert_eq!(m.distance_m, 0.0);
}

#[test]
fn display_formats_are_lowercase_snake_case() {
    assert_eq!(Modality::Motorbike.to_string(), "motorbike");
    assert_eq!(MeasurementStatus::Paused.to_string(), "paused");
}

#[yare::parameterized(
    start_from_none          = { None, MeasurementStatus::Open, true },
    open_to_paused           = { Some(MeasurementStatus::Open), MeasurementStatus::Paused, true },
    paused_to_open           = { Some(MeasurementStatus::Paused), MeasurementStatus::Open, true },
    open_to_finished         = { Some(MeasurementStatus::Open), MeasurementStatus::Finished, true },
    paused_to_finished       = { Some(MeasurementStatus::Paused), MeasurementStatus::Finished, true },
    finished_to_synced       = { Some(MeasurementStatus::Finished), MeasurementStatus::Synced, true },
    open_to_open             = { Some(MeasurementStatus::Open), MeasurementStatus::Open, false },
    paused_to_synced         = { Some(MeasurementStatus::Paused), MeasurementStatus::Synced, false },
    synced_to_open           = { Some(MeasurementStatus::Synced), MeasurementStatus::Open, false },
    finished_to_open         = { Some(MeasurementStatus::Finished), MeasurementStatus::Open, false },
    none_to_paused           = { None, MeasurementStatus::Paused, false },
)]
fn transition_dag(from: Option<MeasurementStatus>, to: MeasurementStatus, expect_ok: bool) {
    let result = MeasurementStatus::validate_transition(from, to);
    assert_eq!(result.is_ok(), expect_ok, "{from:?} -> {to:?}");
}

#[test]
fn invalid_transition_reports_both_endpoints() {
    let err =
        MeasurementStatus::validate_transition(Some(MeasurementStatus::Synced), MeasurementStatus::Open)
            .unwrap_err();
    match err {
        CaptureError::InvalidLifecycleTransition { from, to } => {
            assert_eq!(from, "synced");
            assert_eq!(to, "open");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[yare::parameterized(
    open_is_active     = { MeasurementStatus::Open, true },
    paused_is_active   = { MeasurementStatus::Paused, true },
    finished_not_active = { MeasurementStatus::Finished, false },
    synced_not_active  = { MeasurementStatus::Synced, false },
)]
fn is_active(status: MeasurementStatus, expect: bool) {
    assert_eq!(status.is_active(), expect);
}

#[test]
fn builder_produces_sane_defaults() {
    let m = Measurement::builder().id(MeasurementId::new(7)).build();
    assert_eq!(m.id, MeasurementId::new(7));
    assert_eq!(m.status, MeasurementStatus::Open);
}
