// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle event log.
//!
//! Events are facts about what happened to a measurement. A measurement's
//! track is derived entirely from its persisted event sequence plus its
//! points — see [`crate::track`].

use serde::{Deserialize, Serialize};

use crate::measurement::{MeasurementId, Modality};

/// Tag-only variant of [`CaptureEvent`], used where only the kind matters
/// (queries, DAG bookkeeping) without pulling in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    LifecycleStart,
    LifecyclePause,
    LifecycleResume,
    LifecycleStop,
    ModalityTypeChange,
}

crate::simple_display! {
    EventType {
        LifecycleStart => "lifecycle_start",
        LifecyclePause => "lifecycle_pause",
        LifecycleResume => "lifecycle_resume",
        LifecycleStop => "lifecycle_stop",
        ModalityTypeChange => "modality_type_change",
    }
}

/// A single lifecycle event, appended by the Controller or Worker at a
/// status transition. Serializes as `{"type": "lifecycle_start", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureEvent {
    LifecycleStart { measurement_id: MeasurementId, timestamp_ms: u64 },
    LifecyclePause { measurement_id: MeasurementId, timestamp_ms: u64 },
    LifecycleResume { measurement_id: MeasurementId, timestamp_ms: u64 },
    LifecycleStop { measurement_id: MeasurementId, timestamp_ms: u64 },
    ModalityTypeChange { measurement_id: MeasurementId, timestamp_ms: u64, modality: Modality },
}

impl CaptureEvent {
    pub fn measurement_id(&self) -> MeasurementId {
        match self {
            CaptureEvent::LifecycleStart { measurement_id, .. }
            | CaptureEvent::LifecyclePause { measurement_id, .. }
            | CaptureEvent::LifecycleResume { measurement_id, .. }
            | CaptureEvent::LifecycleStop { measurement_id, .. }
            | CaptureEvent::ModalityTypeChange { measurement_id, .. } => *measurement_id,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        match self {
            CaptureEvent::LifecycleStart { timestamp_ms, .. }
            | CaptureEvent::LifecyclePause { timestamp_ms, .. }
            | CaptureEvent::LifecycleResume { timestamp_ms, .. }
            | CaptureEvent::LifecycleStop { timestamp_ms, .. }
            | CaptureEvent::ModalityTypeChange { timestamp_ms, .. } => *timestamp_ms,
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            CaptureEvent::LifecycleStart { .. } => EventType::LifecycleStart,
            CaptureEvent::LifecyclePause { .. } => EventType::LifecyclePause,
            CaptureEvent::LifecycleResume { .. } => EventType::LifecycleResume,
            CaptureEvent::LifecycleStop { .. } => EventType::LifecycleStop,
            CaptureEvent::ModalityTypeChange { .. } => EventType::ModalityTypeChange,
        }
    }

    /// Whether this event opens a new track segment.
    pub fn opens_segment(&self) -> bool {
        matches!(self, CaptureEvent::LifecycleStart { .. } | CaptureEvent::LifecycleResume { .. })
    }

    /// Whether this event closes the current track segment.
    pub fn closes_segment(&self) -> bool {
        matches!(self, CaptureEvent::LifecyclePause { .. } | CaptureEvent::LifecycleStop { .. })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
