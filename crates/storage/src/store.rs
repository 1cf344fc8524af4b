// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`MeasurementStore`]: the single persistence facade the worker and
//! controller talk to.

use std::path::{Path, PathBuf};

use cap_core::{
    CaptureEvent, GeoLocation, Measurement, MeasurementId, MeasurementStatus, Modality, Pressure,
    SensorPoint, Track,
};
use tracing::{info, warn};

use crate::error::StorageError;
use crate::op::StorageOp;
use crate::snapshot::{load_snapshot, Checkpointer};
use crate::state::MaterializedState;
use crate::wal::Wal;

/// Default number of rows appended as one WAL entry; bounds how large a
/// single JSON line (and a single crash-recovery replay step) gets.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default chunk size for paginated point reads.
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    pub batch_size: usize,
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { batch_size: DEFAULT_BATCH_SIZE, page_size: DEFAULT_PAGE_SIZE }
    }
}

pub struct MeasurementStore {
    wal: Wal,
    state: MaterializedState,
    config: StoreConfig,
    snapshot_path: PathBuf,
}

impl MeasurementStore {
    pub fn open(
        wal_path: &Path,
        snapshot_path: &Path,
        config: StoreConfig,
    ) -> Result<Self, StorageError> {
        let (mut state, processed_seq) = match load_snapshot(snapshot_path)
            .map_err(|e| StorageError::Io { path: snapshot_path.to_path_buf(), source: std::io::Error::other(e) })?
        {
            Some(snapshot) => {
                info!(seq = snapshot.seq, measurements = snapshot.state.measurements.len(), "loaded snapshot");
                (snapshot.state, snapshot.seq)
            }
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(wal_path, processed_seq)?;
        let replay = wal.entries_after(processed_seq)?;
        let replayed = replay.len();
        for entry in &replay {
            state.apply(&entry.op);
            wal.mark_processed(entry.seq);
        }
        if replayed > 0 {
            info!(replayed, "replayed wal entries after snapshot");
        }

        Ok(Self { wal, state, config, snapshot_path: snapshot_path.to_path_buf() })
    }

    fn write(&mut self, op: StorageOp) -> Result<(), StorageError> {
        self.wal.append(&op)?;
        self.state.apply(&op);
        if self.wal.needs_flush() {
            self.wal.flush()?;
        }
        Ok(())
    }

    pub fn new_measurement(
        &mut self,
        modality: Modality,
        file_format_version: u16,
        start_timestamp_ms: u64,
    ) -> Result<MeasurementId, StorageError> {
        let id = MeasurementId::new(self.state.next_measurement_id);
        let measurement = Measurement::new(id, modality, file_format_version, start_timestamp_ms);
        self.write(StorageOp::NewMeasurement { measurement })?;
        Ok(id)
    }

    /// Transition a measurement's status, enforcing the lifecycle DAG.
    pub fn set_status(&mut self, id: MeasurementId, status: MeasurementStatus) -> Result<(), StorageError> {
        let current = self.state.get(id).ok_or(StorageError::NoSuchMeasurement(id))?.status;
        if MeasurementStatus::validate_transition(Some(current), status).is_err() {
            return Err(StorageError::InvalidTransition { from: current, to: status });
        }
        self.write(StorageOp::SetStatus { id, status })
    }

    /// Transition without consulting the DAG. Reserved for crash recovery,
    /// which force-finishes measurements left OPEN/PAUSED by a dead worker.
    pub fn set_status_unvalidated(&mut self, id: MeasurementId, status: MeasurementStatus) -> Result<(), StorageError> {
        if self.state.get(id).is_none() {
            return Err(StorageError::NoSuchMeasurement(id));
        }
        self.write(StorageOp::SetStatus { id, status })
    }

    /// The uploader-facing hook: a confirmed transfer moves the measurement
    /// from FINISHED to SYNCED. Any other current status is rejected.
    pub fn mark_synced(&mut self, id: MeasurementId) -> Result<(), StorageError> {
        self.set_status(id, MeasurementStatus::Synced)
    }

    /// Record a mid-measurement transport change on the measurement row; the
    /// corresponding event is appended separately by the caller.
    pub fn set_modality(&mut self, id: MeasurementId, modality: Modality) -> Result<(), StorageError> {
        if self.state.get(id).is_none() {
            return Err(StorageError::NoSuchMeasurement(id));
        }
        self.write(StorageOp::SetModality { id, modality })
    }

    pub fn update_distance(&mut self, id: MeasurementId, distance_m: f64) -> Result<(), StorageError> {
        self.write(StorageOp::UpdateDistance { id, distance_m })
    }

    pub fn append_locations(&mut self, id: MeasurementId, locations: Vec<GeoLocation>) -> Result<(), StorageError> {
        for chunk in locations.chunks(self.config.batch_size) {
            self.write(StorageOp::AppendLocations { id, locations: chunk.to_vec() })?;
        }
        Ok(())
    }

    pub fn append_sensor_points(&mut self, id: MeasurementId, points: Vec<SensorPoint>) -> Result<(), StorageError> {
        for chunk in points.chunks(self.config.batch_size) {
            self.write(StorageOp::AppendSensorPoints { id, points: chunk.to_vec() })?;
        }
        Ok(())
    }

    pub fn append_pressures(&mut self, id: MeasurementId, pressures: Vec<Pressure>) -> Result<(), StorageError> {
        for chunk in pressures.chunks(self.config.batch_size) {
            self.write(StorageOp::AppendPressures { id, pressures: chunk.to_vec() })?;
        }
        Ok(())
    }

    pub fn append_event(&mut self, id: MeasurementId, event: CaptureEvent) -> Result<(), StorageError> {
        self.write(StorageOp::AppendEvent { id, event })
    }

    pub fn delete_measurement(&mut self, id: MeasurementId) -> Result<(), StorageError> {
        self.write(StorageOp::DeleteMeasurement { id })
    }

    pub fn load_measurement(&self, id: MeasurementId) -> Option<Measurement> {
        self.state.get(id).cloned()
    }

    pub fn load_measurements(&self) -> Vec<Measurement> {
        let mut all: Vec<_> = self.state.measurements.values().cloned().collect();
        all.sort_by_key(|m| m.id);
        all
    }

    pub fn load_measurements_by_status(&self, status: MeasurementStatus) -> Vec<Measurement> {
        let mut matching: Vec<_> = self.state.by_status(status).into_iter().cloned().collect();
        matching.sort_by_key(|m| m.id);
        matching
    }

    /// Chunk a measurement's stored locations into pages of `config.page_size`
    /// rather than handing back one unbounded `Vec`.
    pub fn load_locations_paged(&self, id: MeasurementId) -> impl Iterator<Item = &[GeoLocation]> {
        static EMPTY: &[GeoLocation] = &[];
        self.state.locations.get(&id).map(Vec::as_slice).unwrap_or(EMPTY).chunks(self.config.page_size)
    }

    pub fn load_track(&self, id: MeasurementId) -> Track {
        let events = self.state.events.get(&id).map(Vec::as_slice).unwrap_or(&[]);
        let locations = self.state.locations.get(&id).map(Vec::as_slice).unwrap_or(&[]);
        let pressures = self.state.pressures.get(&id).map(Vec::as_slice).unwrap_or(&[]);
        cap_core::track::reconstruct(events, locations, pressures)
    }

    pub fn flush(&mut self) -> Result<(), StorageError> {
        Ok(self.wal.flush()?)
    }

    /// Write a fresh snapshot and drop WAL entries it makes redundant.
    ///
    /// Called by the controller on a timer, not after every write — a
    /// snapshot this frequent would defeat the point of batching appends.
    pub fn compact(&mut self) -> Result<(), StorageError> {
        self.flush()?;
        let seq = self.wal.write_seq();
        let mut checkpointer = Checkpointer::new(self.snapshot_path.clone(), 0);
        checkpointer
            .write(&self.state, seq, chrono::Utc::now())
            .map_err(|e| StorageError::Io { path: self.snapshot_path.clone(), source: std::io::Error::other(e) })?;
        self.wal.truncate_before(seq + 1)?;
        warn_if_state_grows_unbounded(&self.state);
        Ok(())
    }
}

fn warn_if_state_grows_unbounded(state: &MaterializedState) {
    if state.measurements.len() > 10_000 {
        warn!(count = state.measurements.len(), "measurement table is large; consider pruning synced measurements");
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
