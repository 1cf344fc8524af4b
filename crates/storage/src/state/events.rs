// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler for lifecycle/modality events, kept separate from status so
//! [`super::MaterializedState::events`] stays a plain append log — the
//! authoritative current status lives in `measurements`.

use crate::op::StorageOp;

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, op: &StorageOp) {
    match op {
        StorageOp::AppendEvent { id, event } => {
            state.events.entry(*id).or_default().push(event.clone());
        }

        StorageOp::NewMeasurement { .. }
        | StorageOp::SetStatus { .. }
        | StorageOp::SetModality { .. }
        | StorageOp::UpdateDistance { .. }
        | StorageOp::DeleteMeasurement { .. }
        | StorageOp::AppendLocations { .. }
        | StorageOp::AppendSensorPoints { .. }
        | StorageOp::AppendPressures { .. } => unreachable!("dispatched to a different handler"),
    }
}
