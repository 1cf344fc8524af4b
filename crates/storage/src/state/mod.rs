// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state rebuilt by replaying [`crate::op::StorageOp`]s.

mod events;
mod measurements;
mod points;

use std::collections::HashMap;

use cap_core::{CaptureEvent, GeoLocation, Measurement, MeasurementId, Pressure, SensorPoint};
use serde::{Deserialize, Serialize};

use crate::op::StorageOp;

/// The entire durable state of the capture engine, derived from the WAL.
///
/// Measurements, points, and events are kept in separate maps (rather than
/// nested inside `Measurement`) so a long-running measurement's location
/// stream doesn't have to be cloned every time its status changes.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub measurements: HashMap<MeasurementId, Measurement>,
    #[serde(default)]
    pub locations: HashMap<MeasurementId, Vec<GeoLocation>>,
    #[serde(default)]
    pub sensor_points: HashMap<MeasurementId, Vec<SensorPoint>>,
    #[serde(default)]
    pub pressures: HashMap<MeasurementId, Vec<Pressure>>,
    #[serde(default)]
    pub events: HashMap<MeasurementId, Vec<CaptureEvent>>,
    /// Highest measurement id handed out so far; source of truth for the
    /// monotonic id counter on restart.
    #[serde(default)]
    pub next_measurement_id: u64,
}

impl MaterializedState {
    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.get(&id)
    }

    pub fn by_status(&self, status: cap_core::MeasurementStatus) -> Vec<&Measurement> {
        self.measurements.values().filter(|m| m.status == status).collect()
    }

    /// Apply one persisted operation. Must be idempotent: replaying the WAL
    /// twice over the same state must leave it unchanged the second time.
    pub fn apply(&mut self, op: &StorageOp) {
        match op {
            StorageOp::NewMeasurement { .. }
            | StorageOp::SetStatus { .. }
            | StorageOp::SetModality { .. }
            | StorageOp::UpdateDistance { .. }
            | StorageOp::DeleteMeasurement { .. } => measurements::apply(self, op),

            StorageOp::AppendLocations { .. }
            | StorageOp::AppendSensorPoints { .. }
            | StorageOp::AppendPressures { .. } => points::apply(self, op),

            StorageOp::AppendEvent { .. } => events::apply(self, op),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
