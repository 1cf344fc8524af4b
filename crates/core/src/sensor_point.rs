// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 3-axis inertial sensor samples (accelerometer, rotation, direction).

use serde::{Deserialize, Serialize};

use crate::measurement::MeasurementId;

/// Which inertial sensor a [`SensorPoint`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Acceleration,
    Rotation,
    Direction,
}

crate::simple_display! {
    SensorKind {
        Acceleration => "acceleration",
        Rotation => "rotation",
        Direction => "direction",
    }
}

/// One 3-axis sample, owned by the measurement it was captured during.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorPoint {
    pub measurement_id: MeasurementId,
    pub timestamp_ms: u64,
    pub kind: SensorKind,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SensorPoint {
    pub fn new(
        measurement_id: MeasurementId,
        timestamp_ms: u64,
        kind: SensorKind,
        x: f64,
        y: f64,
        z: f64,
    ) -> Self {
        Self { measurement_id, timestamp_ms, kind, x, y, z }
    }
}

#[cfg(test)]
#[path = "sensor_point_tests.rs"]
mod tests;
