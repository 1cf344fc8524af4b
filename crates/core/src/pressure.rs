// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Barometric pressure readings, averaged to ~1 Hz by the worker.

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;
use crate::measurement::MeasurementId;

/// Documented hPa bounds a pressure reading must fall within.
pub const PRESSURE_MIN_HPA: f64 = 250.0;
pub const PRESSURE_MAX_HPA: f64 = 1100.0;

/// A pressure reading produced by averaging raw barometer samples over a
/// one-second window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pressure {
    pub measurement_id: MeasurementId,
    pub timestamp_ms: u64,
    pub value_hpa: f64,
}

impl Pressure {
    pub fn new(
        measurement_id: MeasurementId,
        timestamp_ms: u64,
        value_hpa: f64,
    ) -> Result<Self, CaptureError> {
        if !(PRESSURE_MIN_HPA..=PRESSURE_MAX_HPA).contains(&value_hpa) {
            return Err(CaptureError::RangeViolation { field: "value_hpa", value: value_hpa });
        }
        Ok(Self { measurement_id, timestamp_ms, value_hpa })
    }
}

#[cfg(test)]
#[path = "pressure_tests.rs"]
mod tests;
