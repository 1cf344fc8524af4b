// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batches raw inertial samples into [`SensorPoint`]s for persistence
//!.

use cap_core::{MeasurementId, SensorPoint};

use crate::source::RawSensorSample;

/// Accumulates samples until `capacity` is reached, then hands back a full
/// batch. Sensor batches are the one thing the worker may drop under
/// write-queue pressure, so keeping this a plain `Vec` (rather than a
/// ring buffer) is fine — [`crate::batch::BoundedQueue`] is what enforces the
/// drop policy above this.
pub struct SensorBatcher {
    capacity: usize,
    buffer: Vec<SensorPoint>,
}

impl SensorBatcher {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, buffer: Vec::with_capacity(capacity) }
    }

    /// Push one sample; returns a full batch if `capacity` was reached.
    pub fn push(&mut self, measurement_id: MeasurementId, sample: RawSensorSample) -> Option<Vec<SensorPoint>> {
        self.buffer.push(SensorPoint::new(
            measurement_id,
            sample.timestamp_ms,
            sample.kind,
            sample.x,
            sample.y,
            sample.z,
        ));
        if self.buffer.len() >= self.capacity {
            Some(std::mem::take(&mut self.buffer))
        } else {
            None
        }
    }

    /// Flush whatever is buffered, e.g. on pause/stop.
    pub fn drain(&mut self) -> Vec<SensorPoint> {
        std::mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
#[path = "sensors_tests.rs"]
mod tests;
