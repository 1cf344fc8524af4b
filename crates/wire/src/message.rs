// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use cap_core::{CaptureError, GeoLocation, MeasurementId, SensorPoint};
use cap_strategies::{CleaningStrategy, DistanceStrategy, SensorCapture, SpaceStrategy};
use serde::{Deserialize, Serialize};

/// Identifies one round of the liveness probe/pong exchange.
///
/// Monotonically issued by the controller so a late pong from an earlier,
/// already-timed-out probe can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeId(pub u64);

/// Why the worker stopped itself without the controller asking it to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The low-disk guard tripped and the active [`SpaceStrategy`] is `StopWorker`.
    LowDiskSpace,
    /// The source reported that location permission was revoked mid-measurement.
    PermissionRevoked,
    /// A batch write failed twice in a row; the pipeline cannot make progress.
    PersistenceFailed,
}

/// Command sent from the controller to a running worker task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToWorker {
    /// Begin capturing for `measurement_id`, under the given strategies.
    Start {
        measurement_id: MeasurementId,
        distance_strategy: DistanceStrategy,
        cleaning_strategy: CleaningStrategy,
        sensor_capture: SensorCapture,
        space_strategy: SpaceStrategy,
    },
    /// Suspend capture; the worker keeps its in-memory accumulators.
    Pause,
    /// Resume capture after a pause.
    Resume,
    /// Flush and terminate the pipeline; the worker exits after replying.
    Stop,
    /// Liveness probe; the worker must reply with [`FromWorker::Pong`] carrying the same id.
    Probe(ProbeId),
}

/// Event emitted from the worker task back to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FromWorker {
    /// The pipeline is running, its start event is durable, and the source
    /// subscriptions are open.
    Started,
    /// Reply to [`ToWorker::Pause`]; sent once the pause event is durable and
    /// the source subscriptions have been released.
    Paused,
    /// Reply to [`ToWorker::Resume`]; sent once the resume event is durable
    /// and fresh source subscriptions are open.
    Resumed,
    /// A cleaned, accepted fix was persisted.
    LocationCaptured { location: GeoLocation },
    /// A batch of inertial samples was persisted.
    SensorDataCaptured { points: Vec<SensorPoint> },
    /// GNSS fixes resumed after a gap of at least the configured inactivity window.
    GnssFixAcquired { timestamp_ms: u64 },
    /// No GNSS fix has been seen for at least the configured inactivity window.
    GnssFixLost { timestamp_ms: u64 },
    /// The location source reported that permission is missing.
    MissingPermission,
    /// Reply to [`ToWorker::Stop`]; `stopped_successfully` is `true` unless
    /// the measurement was paused when the stop arrived.
    Stopped { stopped_successfully: bool },
    /// The worker stopped on its own initiative; see [`StopReason`].
    StoppedItself { reason: StopReason },
    /// The pipeline hit an unrecoverable error and is shutting down.
    ErrorState { error: CaptureError },
    /// Reply to [`ToWorker::Probe`], echoing the same id.
    Pong(ProbeId),
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
