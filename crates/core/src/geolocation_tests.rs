// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn mid() -> MeasurementId {
    MeasurementId::new(1)
}

#[yare::parameterized(
    lat_min_boundary  = { 1_000, -90.0, 0.0, true },
    lat_max_boundary  = { 1_000, 90.0, 0.0, true },
    lat_below_min     = { 1_000, -90.1, 0.0, false },
    lat_above_max     = { 1_000, 90.1, 0.0, false },
    lon_min_boundary  = { 1_000, 0.0, -180.0, true },
    lon_max_boundary  = { 1_000, 0.0, 180.0, true },
    lon_below_min     = { 1_000, 0.0, -180.1, false },
    lon_above_max     = { 1_000, 0.0, 180.1, false },
    timestamp_zero    = { 0, 0.0, 0.0, true },
)]
fn lat_lon_bounds(timestamp_ms: u64, lat: f64, lon: f64, expect_ok: bool) {
    let result = GeoLocation::new(mid(), timestamp_ms, lat, lon, None, 1.0, None, None);
    assert_eq!(result.is_ok(), expect_ok);
}

#[test]
fn negative_speed_is_tolerated() {
    let loc = GeoLocation::new(mid(), 0, 0.0, 0.0, None, -1.0, None, None).unwrap();
    assert_eq!(loc.speed_mps, -1.0);
}

#[test]
fn negative_horizontal_accuracy_is_rejected() {
    let err = GeoLocation::new(mid(), 0, 0.0, 0.0, None, 1.0, Some(-1.0), None).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::RangeViolation { field: "horizontal_accuracy_m", .. }
    ));
}

#[test]
fn negative_vertical_accuracy_is_rejected() {
    let err = GeoLocation::new(mid(), 0, 0.0, 0.0, None, 1.0, None, Some(-1.0)).unwrap_err();
    assert!(matches!(err, CaptureError::RangeViolation { field: "vertical_accuracy_m", .. }));
}

#[test]
fn new_location_is_not_valid_until_cleaning_strategy_runs() {
    let loc = GeoLocation::new(mid(), 0, 0.0, 0.0, None, 1.0, None, None).unwrap();
    assert!(!loc.valid);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn in_range_inputs_always_ingest_with_fields_intact(
            lat in -90.0f64..=90.0,
            lon in -180.0f64..=180.0,
            speed in -5.0f64..=60.0,
            accuracy in proptest::option::of(0.0f64..=500.0),
        ) {
            let loc = GeoLocation::new(mid(), 1_000, lat, lon, None, speed, accuracy, None).unwrap();
            prop_assert_eq!(loc.lat, lat);
            prop_assert_eq!(loc.lon, lon);
            prop_assert_eq!(loc.speed_mps, speed);
            prop_assert_eq!(loc.horizontal_accuracy_m, accuracy);
        }

        #[test]
        fn out_of_range_latitude_never_ingests(
            lat in prop_oneof![-1.0e6f64..-90.0001, 90.0001..1.0e6f64],
        ) {
            prop_assert!(GeoLocation::new(mid(), 0, lat, 0.0, None, 1.0, None, None).is_err());
        }

        #[test]
        fn out_of_range_longitude_never_ingests(
            lon in prop_oneof![-1.0e6f64..-180.0001, 180.0001..1.0e6f64],
        ) {
            prop_assert!(GeoLocation::new(mid(), 0, 0.0, lon, None, 1.0, None, None).is_err());
        }
    }
}
