// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Measurement identity, status, and the modality a trip is recorded under.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CaptureError;

/// Unique identifier for a measurement, monotonically assigned by the store.
///
/// Unlike [`crate::DeviceId`] this is not a random value: the persistence
/// layer owns the counter and hands out ids in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementId(pub u64);

impl MeasurementId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MeasurementId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Declared transport type for a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Bicycle,
    Car,
    Motorbike,
    Bus,
    Train,
    Walking,
    Unknown,
}

crate::simple_display! {
    Modality {
        Bicycle => "bicycle",
        Car => "car",
        Motorbike => "motorbike",
        Bus => "bus",
        Train => "train",
        Walking => "walking",
        Unknown => "unknown",
    }
}

/// Lifecycle status of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementStatus {
    Open,
    Paused,
    Finished,
    Synced,
}

crate::simple_display! {
    MeasurementStatus {
        Open => "open",
        Paused => "paused",
        Finished => "finished",
        Synced => "synced",
    }
}

impl MeasurementStatus {
    /// Whether a measurement in this status counts toward the "at most one
    /// OPEN/PAUSED measurement" invariant.
    pub fn is_active(self) -> bool {
        matches!(self, MeasurementStatus::Open | MeasurementStatus::Paused)
    }

    /// Validate a transition against the lifecycle DAG. `None` as `from`
    /// means "no prior status" (only valid as the source of a `start`).
    pub fn validate_transition(
        from: Option<MeasurementStatus>,
        to: MeasurementStatus,
    ) -> Result<(), CaptureError> {
        let ok = matches!(
            (from, to),
            (None, MeasurementStatus::Open)
                | (Some(MeasurementStatus::Open), MeasurementStatus::Paused)
                | (Some(MeasurementStatus::Paused), MeasurementStatus::Open)
                | (Some(MeasurementStatus::Open), MeasurementStatus::Finished)
                | (Some(MeasurementStatus::Paused), MeasurementStatus::Finished)
                | (Some(MeasurementStatus::Finished), MeasurementStatus::Synced)
        );
        if ok {
            Ok(())
        } else {
            Err(CaptureError::InvalidLifecycleTransition {
                from: from.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string()),
                to: to.to_string(),
            })
        }
    }
}

/// A complete recording of a single user trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    pub status: MeasurementStatus,
    pub modality: Modality,
    pub file_format_version: u16,
    pub distance_m: f64,
    pub start_timestamp_ms: u64,
}

impl Measurement {
    pub fn new(
        id: MeasurementId,
        modality: Modality,
        file_format_version: u16,
        start_timestamp_ms: u64,
    ) -> Self {
        Self {
            id,
            status: MeasurementStatus::Open,
            modality,
            file_format_version,
            distance_m: 0.0,
            start_timestamp_ms,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct MeasurementBuilder => Measurement {
        set {
            id: MeasurementId = MeasurementId::new(1),
            status: MeasurementStatus = MeasurementStatus::Open,
            modality: Modality = Modality::Unknown,
            file_format_version: u16 = 1,
            distance_m: f64 = 0.0,
            start_timestamp_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "measurement_tests.rs"]
mod tests;
