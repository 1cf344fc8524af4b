// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded write queue in front of [`cap_storage::MeasurementStore`].
//!
//! Locations and lifecycle events are never dropped; the pipeline backs off
//! instead. Sensor batches may be dropped under pressure since they're
//! sampled at a much higher rate and a gap in inertial data doesn't corrupt
//! the track.

use std::collections::VecDeque;

use cap_core::{CaptureEvent, GeoLocation, MeasurementId, Pressure, SensorPoint};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum WriteItem {
    Locations { id: MeasurementId, locations: Vec<GeoLocation> },
    SensorPoints { id: MeasurementId, points: Vec<SensorPoint> },
    Pressures { id: MeasurementId, pressures: Vec<Pressure> },
    Event { id: MeasurementId, event: CaptureEvent },
}

impl WriteItem {
    fn is_droppable(&self) -> bool {
        matches!(self, WriteItem::SensorPoints { .. })
    }
}

/// A queue with a soft capacity: once full, the oldest pending droppable
/// item is evicted (and counted) to make room, while non-droppable items
/// still get pushed, growing the queue past capacity rather than losing
/// locations or lifecycle events.
pub struct BoundedQueue {
    capacity: usize,
    items: VecDeque<WriteItem>,
    dropped_sensor_batches: u64,
}

impl BoundedQueue {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, items: VecDeque::new(), dropped_sensor_batches: 0 }
    }

    pub fn dropped_sensor_batches(&self) -> u64 {
        self.dropped_sensor_batches
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: WriteItem) {
        if self.items.len() >= self.capacity && item.is_droppable() {
            self.dropped_sensor_batches += 1;
            warn!(dropped_total = self.dropped_sensor_batches, "dropping oldest sensor batch under write-queue pressure");
            // Drop the oldest pending sensor batch to make room; if every
            // queued item is non-droppable, the incoming batch is itself the
            // oldest droppable one and is discarded instead.
            match self.items.iter().position(WriteItem::is_droppable) {
                Some(oldest) => {
                    self.items.remove(oldest);
                }
                None => return,
            }
        }
        self.items.push_back(item);
    }

    pub fn pop(&mut self) -> Option<WriteItem> {
        self.items.pop_front()
    }

    pub fn drain(&mut self) -> Vec<WriteItem> {
        self.items.drain(..).collect()
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
