// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener fan-out: one event sum type, one subscription channel.
//!
//! The host subscribes once and matches on [`HostEvent`] instead of
//! registering a handler object per event kind. Slow subscribers lag and
//! lose the oldest events rather than back-pressuring the engine.

use cap_core::{CaptureError, GeoLocation, MeasurementId, SensorPoint};
use cap_wire::StopReason;
use tokio::sync::broadcast;

/// Everything a host listener can observe from a capture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The worker is up and its start (or resume) event is durable.
    ServiceStarted { measurement_id: MeasurementId },
    /// The completion signal: the measurement reached FINISHED.
    /// `stopped_successfully` is `false` when the worker was not actively
    /// capturing at the time (stopped while paused, or stopped itself).
    ServiceStopped { measurement_id: MeasurementId, stopped_successfully: bool },
    /// The worker exited on its own initiative (low disk, revoked
    /// permission, persistent store failure).
    ServiceStoppedItself { measurement_id: MeasurementId, reason: StopReason },
    LocationCaptured { location: GeoLocation },
    SensorDataCaptured { points: Vec<SensorPoint> },
    GnssFixAcquired { timestamp_ms: u64 },
    GnssFixLost { timestamp_ms: u64 },
    MissingPermission { measurement_id: MeasurementId },
    ErrorState { error: CaptureError },
}

/// Broadcast bus carrying [`HostEvent`]s to however many listeners the host
/// attaches. Cloning shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<HostEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.tx.subscribe()
    }

    /// Send to all current subscribers; an event with no listener is simply
    /// dropped.
    pub fn send(&self, event: HostEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
