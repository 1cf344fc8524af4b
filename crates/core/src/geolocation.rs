// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GNSS fix attached to a measurement.

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;
use crate::measurement::MeasurementId;

/// A single GNSS-provided position estimate.
///
/// Constructed only through [`GeoLocation::new`], which enforces the
/// documented ranges. Negative speed is tolerated (some devices report it);
/// negative accuracy is a hard reject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub measurement_id: MeasurementId,
    pub timestamp_ms: u64,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: Option<f64>,
    pub speed_mps: f64,
    pub horizontal_accuracy_m: Option<f64>,
    pub vertical_accuracy_m: Option<f64>,
    /// Whether `LocationCleaningStrategy` accepted this fix for distance
    /// accumulation. Derived at ingest time, not range-checked here.
    pub valid: bool,
}

#[allow(clippy::too_many_arguments)]
impl GeoLocation {
    pub fn new(
        measurement_id: MeasurementId,
        timestamp_ms: u64,
        lat: f64,
        lon: f64,
        altitude_m: Option<f64>,
        speed_mps: f64,
        horizontal_accuracy_m: Option<f64>,
        vertical_accuracy_m: Option<f64>,
    ) -> Result<Self, CaptureError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CaptureError::RangeViolation { field: "lat", value: lat });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CaptureError::RangeViolation { field: "lon", value: lon });
        }
        if let Some(acc) = horizontal_accuracy_m {
            if acc < 0.0 {
                return Err(CaptureError::RangeViolation {
                    field: "horizontal_accuracy_m",
                    value: acc,
                });
            }
        }
        if let Some(acc) = vertical_accuracy_m {
            if acc < 0.0 {
                return Err(CaptureError::RangeViolation {
                    field: "vertical_accuracy_m",
                    value: acc,
                });
            }
        }
        Ok(Self {
            measurement_id,
            timestamp_ms,
            lat,
            lon,
            altitude_m,
            speed_mps,
            horizontal_accuracy_m,
            vertical_accuracy_m,
            valid: false,
        })
    }
}

#[cfg(test)]
#[path = "geolocation_tests.rs"]
mod tests;
