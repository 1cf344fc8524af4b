// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The unit of mutation written to the WAL and replayed into [`crate::MaterializedState`].

use cap_core::{
    CaptureEvent, GeoLocation, Measurement, MeasurementId, MeasurementStatus, Modality, Pressure,
    SensorPoint,
};
use serde::{Deserialize, Serialize};

/// One persistence-layer fact.
///
/// Every measurement write goes through one of these variants so that crash
/// recovery can replay the WAL into an equivalent [`crate::MaterializedState`]
/// regardless of whether the process crashed mid-batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum StorageOp {
    NewMeasurement { measurement: Measurement },
    SetStatus { id: MeasurementId, status: MeasurementStatus },
    SetModality { id: MeasurementId, modality: Modality },
    UpdateDistance { id: MeasurementId, distance_m: f64 },
    AppendLocations { id: MeasurementId, locations: Vec<GeoLocation> },
    AppendSensorPoints { id: MeasurementId, points: Vec<SensorPoint> },
    AppendPressures { id: MeasurementId, pressures: Vec<Pressure> },
    AppendEvent { id: MeasurementId, event: CaptureEvent },
    DeleteMeasurement { id: MeasurementId },
}

impl StorageOp {
    pub fn measurement_id(&self) -> MeasurementId {
        match self {
            StorageOp::NewMeasurement { measurement } => measurement.id,
            StorageOp::SetStatus { id, .. }
            | StorageOp::SetModality { id, .. }
            | StorageOp::UpdateDistance { id, .. }
            | StorageOp::AppendLocations { id, .. }
            | StorageOp::AppendSensorPoints { id, .. }
            | StorageOp::AppendPressures { id, .. }
            | StorageOp::AppendEvent { id, .. }
            | StorageOp::DeleteMeasurement { id } => *id,
        }
    }
}
