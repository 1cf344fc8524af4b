// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Which inertial sensors a measurement subscribes to.

use serde::{Deserialize, Serialize};

/// Part of the `start` command payload; chosen once per measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorCapture {
    /// Subscribes to accelerometer, rotation, and direction, plus pressure
    /// at 1 Hz average.
    Enabled { frequency_hz: f64 },
    /// Subscribes only to pressure.
    Disabled,
}

impl Default for SensorCapture {
    fn default() -> Self {
        SensorCapture::Enabled { frequency_hz: 50.0 }
    }
}

impl SensorCapture {
    pub fn captures_inertial(self) -> bool {
        matches!(self, SensorCapture::Enabled { .. })
    }
}

#[cfg(test)]
#[path = "sensor_capture_tests.rs"]
mod tests;
