// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders and fixtures shared across crates (feature `test-support`).

use crate::geolocation::GeoLocation;
use crate::measurement::MeasurementId;

/// Build a valid [`GeoLocation`] for tests, overriding only what matters to
/// the case at hand.
pub fn geolocation(
    measurement_id: MeasurementId,
    timestamp_ms: u64,
    lat: f64,
    lon: f64,
) -> GeoLocation {
    GeoLocation::new(measurement_id, timestamp_ms, lat, lon, None, 1.0, Some(5.0), None)
        .expect("test fixture must be in range")
}
