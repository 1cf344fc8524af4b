// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handlers for the measurement lifecycle ops.

use crate::op::StorageOp;

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, op: &StorageOp) {
    match op {
        StorageOp::NewMeasurement { measurement } => {
            if measurement.id.get() >= state.next_measurement_id {
                state.next_measurement_id = measurement.id.get() + 1;
            }
            state.measurements.entry(measurement.id).or_insert_with(|| measurement.clone());
        }

        StorageOp::SetStatus { id, status } => {
            if let Some(m) = state.measurements.get_mut(id) {
                m.status = *status;
            }
        }

        StorageOp::SetModality { id, modality } => {
            if let Some(m) = state.measurements.get_mut(id) {
                m.modality = *modality;
            }
        }

        StorageOp::UpdateDistance { id, distance_m } => {
            if let Some(m) = state.measurements.get_mut(id) {
                m.distance_m = *distance_m;
            }
        }

        StorageOp::DeleteMeasurement { id } => {
            state.measurements.remove(id);
            state.locations.remove(id);
            state.sensor_points.remove(id);
            state.pressures.remove(id);
            state.events.remove(id);
        }

        StorageOp::AppendLocations { .. }
        | StorageOp::AppendSensorPoints { .. }
        | StorageOp::AppendPressures { .. }
        | StorageOp::AppendEvent { .. } => unreachable!("dispatched to a different handler"),
    }
}
