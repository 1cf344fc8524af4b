// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use cap_core::CaptureError;
use thiserror::Error;

/// Errors surfaced while constructing or configuring the engine. Lifecycle
/// operations themselves return [`CaptureError`] directly.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(#[from] toml::de::Error),
}
