// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use cap_core::CaptureError;
use thiserror::Error;

use crate::wal::WalError;

/// Narrow, crate-local error type; converts into [`CaptureError`] at the
/// boundary so `cap-worker`/`cap-controller` don't depend on WAL internals.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Wal(#[from] WalError),

    #[error("io error at {path}: {source}")]
    Io { path: std::path::PathBuf, #[source] source: std::io::Error },

    #[error("no such measurement: {0}")]
    NoSuchMeasurement(cap_core::MeasurementId),

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: cap_core::MeasurementStatus, to: cap_core::MeasurementStatus },
}

impl From<StorageError> for CaptureError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NoSuchMeasurement(_) => CaptureError::NoSuchMeasurement,
            StorageError::InvalidTransition { from, to } => CaptureError::InvalidLifecycleTransition {
                from: from.to_string(),
                to: to.to_string(),
            },
            other => CaptureError::PersistenceFailure(other.to_string()),
        }
    }
}
