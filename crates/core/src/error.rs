// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across the capture engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the capture lifecycle and pipeline.
///
/// `cap-storage` and `cap-worker` define narrower, crate-local error enums
/// and convert into this one at their public boundary, rather than
/// depending on each other's error types directly.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaptureError {
    #[error("fine-location permission is not granted")]
    MissingPermission,

    #[error("no measurement in the required state")]
    NoSuchMeasurement,

    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidLifecycleTransition { from: String, to: String },

    #[error("a prior measurement was left open or paused and has been recovered")]
    CorruptedMeasurement,

    #[error("worker did not acknowledge start within the deadline")]
    WorkerStartTimeout,

    #[error("worker did not acknowledge stop within the deadline")]
    WorkerStopTimeout,

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("{field} out of range: {value}")]
    RangeViolation {
        #[serde(with = "range_violation_field")]
        field: StaticFieldName,
        value: f64,
    },
}

/// Alias for `&'static str` used only by [`CaptureError::RangeViolation`].
///
/// serde_derive scans a field's declared type for lifetime tokens to decide
/// whether the surrounding `Deserialize<'de>` impl must require `'de:
/// 'static` — and it does this by inspecting the syntax, not the resolved
/// type, so a literal `&'static str` field triggers that bound even though
/// the custom `deserialize_with` below never borrows from `'de`. Hiding the
/// `'static` behind a type alias keeps the field's real type (`&'static
/// str`) unchanged while making that bound disappear, which is required for
/// `CaptureError` to nest inside another `#[derive(Deserialize)]` type (e.g.
/// `cap_wire::FromWorker`) whose own `'de` isn't `'static`.
type StaticFieldName = &'static str;

/// See [`StaticFieldName`] for why this module exists instead of deriving
/// `Deserialize` directly on the field. `field` is always one of a closed
/// set of literals naming a struct field (see call sites in `geolocation.rs`
/// and `pressure.rs`), so round-tripping through that set recovers a
/// `&'static str` without leaking memory.
mod range_violation_field {
    use super::StaticFieldName;
    use serde::{Deserialize, Deserializer, Serializer};

    const KNOWN: &[&str] = &[
        "lat",
        "lon",
        "horizontal_accuracy_m",
        "vertical_accuracy_m",
        "value_hpa",
    ];

    pub fn serialize<S: Serializer>(value: &StaticFieldName, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StaticFieldName, D::Error> {
        let value = String::deserialize(deserializer)?;
        KNOWN
            .iter()
            .copied()
            .find(|known| *known == value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown RangeViolation field: {value}")))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
