// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-measurement capture pipeline: wires the GNSS,
//! inertial, and barometer processors to the write queue and storage facade.
//!
//! [`crate::actor`] owns the I/O (channels, sources); this module owns the
//! decision logic so it can be driven synchronously from tests without an
//! executor.

use std::sync::Arc;

use cap_core::{CaptureError, CaptureEvent, MeasurementId, MeasurementStatus};
use cap_storage::MeasurementStore;
use cap_strategies::{CleaningStrategy, DistanceStrategy, SensorCapture, SpaceStrategy, StrategyRegistry};
use cap_wire::FromWorker;

use crate::batch::{BoundedQueue, WriteItem};
use crate::gnss::{FixTransition, GnssOutcome, GnssProcessor};
use crate::low_disk::{FreeSpaceProbe, LowDiskGuard};
use crate::pressure::PressureAggregator;
use crate::sensors::SensorBatcher;
use crate::source::{RawFix, RawPressureSample, RawSensorSample};

/// Inertial samples are buffered this many at a time before being handed to
/// the write queue as one [`WriteItem::SensorPoints`].
pub const DEFAULT_SENSOR_BATCH_CAPACITY: usize = 200;

/// Barometer samples are averaged over this window.
pub const DEFAULT_PRESSURE_WINDOW_MS: u64 = 1_000;

/// Write-queue soft capacity before sensor batches start getting dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Why a drain could not complete; either way the worker stops itself.
#[derive(Debug, PartialEq)]
pub enum DrainStop {
    /// Free space fell below the threshold and the active strategy says stop.
    LowDisk,
    /// A batch write failed twice in a row.
    Persistence(CaptureError),
}

pub struct Pipeline {
    measurement_id: MeasurementId,
    registry: Arc<StrategyRegistry>,
    gnss: GnssProcessor,
    sensor_capture: SensorCapture,
    sensor_batcher: SensorBatcher,
    pressure: PressureAggregator,
    queue: BoundedQueue,
    low_disk: LowDiskGuard,
}

impl Pipeline {
    pub fn new(
        measurement_id: MeasurementId,
        registry: Arc<StrategyRegistry>,
        distance_strategy: DistanceStrategy,
        cleaning_strategy: CleaningStrategy,
        sensor_capture: SensorCapture,
        space_strategy: SpaceStrategy,
        inactivity_window_ms: u64,
        low_disk_threshold_bytes: u64,
    ) -> Self {
        Self {
            measurement_id,
            registry,
            gnss: GnssProcessor::new(distance_strategy, cleaning_strategy, inactivity_window_ms),
            sensor_capture,
            sensor_batcher: SensorBatcher::new(DEFAULT_SENSOR_BATCH_CAPACITY),
            pressure: PressureAggregator::new(DEFAULT_PRESSURE_WINDOW_MS),
            queue: BoundedQueue::new(DEFAULT_QUEUE_CAPACITY),
            low_disk: LowDiskGuard::new(low_disk_threshold_bytes, space_strategy),
        }
    }

    /// Handle one GNSS fix: validate, clean, accumulate distance, queue the
    /// location for persistence, and report any fix-lost/acquired edge.
    pub fn on_fix(&mut self, store: &mut MeasurementStore, fix: RawFix) -> Vec<FromWorker> {
        let (outcome, transition) = self.gnss.process(&self.registry, self.measurement_id, fix);
        let mut events = Vec::new();

        match outcome {
            GnssOutcome::Accepted { location, .. } => {
                self.queue.push(WriteItem::Locations { id: self.measurement_id, locations: vec![location] });
                let _ = store.update_distance(self.measurement_id, self.gnss.total_distance_m());
                events.push(FromWorker::LocationCaptured { location });
            }
            GnssOutcome::Rejected { location } => {
                self.queue.push(WriteItem::Locations { id: self.measurement_id, locations: vec![location] });
            }
            GnssOutcome::Invalid(_) => {}
        }

        if let Some(transition) = transition {
            events.push(self.transition_event(transition, fix.timestamp_ms));
        }
        events
    }

    /// Periodic tick, independent of fix arrival, to notice a stalled GNSS
    /// stream.
    pub fn check_inactivity(&mut self, now_ms: u64) -> Option<FromWorker> {
        self.gnss.check_inactivity(now_ms).map(|t| self.transition_event(t, now_ms))
    }

    fn transition_event(&self, transition: FixTransition, timestamp_ms: u64) -> FromWorker {
        match transition {
            FixTransition::Acquired => FromWorker::GnssFixAcquired { timestamp_ms },
            FixTransition::Lost => FromWorker::GnssFixLost { timestamp_ms },
        }
    }

    /// Handle one inertial sample, if sensor capture is enabled for this
    /// measurement; queues a batch once full.
    pub fn on_sensor_sample(&mut self, sample: RawSensorSample) -> Option<FromWorker> {
        if !self.sensor_capture.captures_inertial() {
            return None;
        }
        let batch = self.sensor_batcher.push(self.measurement_id, sample)?;
        self.queue.push(WriteItem::SensorPoints { id: self.measurement_id, points: batch.clone() });
        Some(FromWorker::SensorDataCaptured { points: batch })
    }

    /// Handle one barometer sample; queues an averaged reading once a window
    /// closes.
    pub fn on_pressure_sample(&mut self, sample: RawPressureSample) {
        if let Some(pressure) = self.pressure.push(self.measurement_id, sample) {
            self.queue.push(WriteItem::Pressures { id: self.measurement_id, pressures: vec![pressure] });
        }
    }

    /// Flush whatever the batchers are holding, e.g. on pause/stop.
    pub fn flush_partial_windows(&mut self) {
        let sensors = self.sensor_batcher.drain();
        if !sensors.is_empty() {
            self.queue.push(WriteItem::SensorPoints { id: self.measurement_id, points: sensors });
        }
        if let Some(pressure) = self.pressure.flush(self.measurement_id) {
            self.queue.push(WriteItem::Pressures { id: self.measurement_id, pressures: vec![pressure] });
        }
    }

    pub fn queue_event(&mut self, event: CaptureEvent) {
        self.queue.push(WriteItem::Event { id: self.measurement_id, event });
    }

    /// Drain the write queue into storage. The low-disk guard runs before any
    /// write; a transient batch failure is retried once, and a second failure
    /// aborts the drain so the worker can surface an error state and stop.
    pub fn drain_queue(
        &mut self,
        store: &mut MeasurementStore,
        probe: &dyn FreeSpaceProbe,
    ) -> Result<(), DrainStop> {
        if self.low_disk.check(probe) {
            return Err(DrainStop::LowDisk);
        }
        self.drain_items(store)
    }

    /// Final drain on the way out: skips the low-disk guard so the stop
    /// event itself still gets persisted.
    pub fn drain_for_shutdown(&mut self, store: &mut MeasurementStore) -> Result<(), DrainStop> {
        self.drain_items(store)
    }

    fn drain_items(&mut self, store: &mut MeasurementStore) -> Result<(), DrainStop> {
        for item in self.queue.drain() {
            if let Err(e) = write_item(store, &item) {
                tracing::warn!(error = %e, "batch write failed; retrying once");
                if let Err(e) = write_item(store, &item) {
                    tracing::error!(error = %e, "batch write failed twice");
                    return Err(DrainStop::Persistence(e.into()));
                }
            }
        }
        Ok(())
    }

    pub fn close_out(&self, store: &mut MeasurementStore) -> Result<(), cap_storage::StorageError> {
        store.set_status(self.measurement_id, MeasurementStatus::Finished)
    }
}

fn write_item(store: &mut MeasurementStore, item: &WriteItem) -> Result<(), cap_storage::StorageError> {
    match item {
        WriteItem::Locations { id, locations } => store.append_locations(*id, locations.clone()),
        WriteItem::SensorPoints { id, points } => store.append_sensor_points(*id, points.clone()),
        WriteItem::Pressures { id, pressures } => store.append_pressures(*id, pressures.clone()),
        WriteItem::Event { id, event } => store.append_event(*id, event.clone()),
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
