// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash recovery: measurements a dead worker left OPEN or PAUSED.
//!
//! A process death mid-capture leaves the active measurement's status
//! behind. The next `start` finds it, force-finishes it without distance or
//! integrity validation (the data that made it to the WAL is all there is),
//! and proceeds. The same scan backs the corrupted-measurement check in
//! `Controller::try_start`.

use cap_core::{CaptureError, Measurement, MeasurementId, MeasurementStatus};
use cap_storage::SharedStore;
use tracing::warn;

/// All measurements currently marked OPEN or PAUSED, ordered by id.
pub fn active_measurements(store: &SharedStore) -> Vec<Measurement> {
    let store = store.lock();
    let mut active = store.load_measurements_by_status(MeasurementStatus::Open);
    active.extend(store.load_measurements_by_status(MeasurementStatus::Paused));
    active.sort_by_key(|m| m.id);
    active
}

/// Force every OPEN/PAUSED measurement to FINISHED, skipping transition
/// validation, and flush. Returns the recovered ids.
pub fn force_finish_active(store: &SharedStore) -> Result<Vec<MeasurementId>, CaptureError> {
    let ids: Vec<_> = active_measurements(store).into_iter().map(|m| m.id).collect();
    let mut store = store.lock();
    for id in &ids {
        warn!(measurement_id = id.get(), "force-finishing measurement left behind by a dead worker");
        store.set_status_unvalidated(*id, MeasurementStatus::Finished).map_err(CaptureError::from)?;
    }
    store.flush().map_err(CaptureError::from)?;
    Ok(ids)
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
