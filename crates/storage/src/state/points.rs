// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handlers for location, sensor, and pressure point batches.
//!
//! Replaying the same `Append*` op twice would duplicate points — the WAL
//! only ever grows by appending a previously-unwritten batch, so unlike the
//! measurement-status handlers this does not need an existence guard.

use crate::op::StorageOp;

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, op: &StorageOp) {
    match op {
        StorageOp::AppendLocations { id, locations } => {
            state.locations.entry(*id).or_default().extend(locations.iter().cloned());
        }

        StorageOp::AppendSensorPoints { id, points } => {
            state.sensor_points.entry(*id).or_default().extend(points.iter().cloned());
        }

        StorageOp::AppendPressures { id, pressures } => {
            state.pressures.entry(*id).or_default().extend(pressures.iter().cloned());
        }

        StorageOp::NewMeasurement { .. }
        | StorageOp::SetStatus { .. }
        | StorageOp::SetModality { .. }
        | StorageOp::UpdateDistance { .. }
        | StorageOp::DeleteMeasurement { .. }
        | StorageOp::AppendEvent { .. } => unreachable!("dispatched to a different handler"),
    }
}
