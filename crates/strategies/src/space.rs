// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reaction to a low-disk-space warning before a batch write.

use serde::{Deserialize, Serialize};

/// `EventHandlingStrategy.handleSpaceWarning(workerHandle)`.
///
/// The worker calls [`SpaceStrategy::should_stop`] before each batch write
/// once free disk has fallen below the configured threshold; a `true`
/// result means the worker requests `StopSelf` on itself and emits
/// `ServiceStoppedItself`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpaceStrategy {
    /// Log and continue (the default).
    Ignore,
    /// Stop the worker.
    StopWorker,
}

impl Default for SpaceStrategy {
    fn default() -> Self {
        SpaceStrategy::Ignore
    }
}

impl SpaceStrategy {
    pub fn should_stop(self) -> bool {
        matches!(self, SpaceStrategy::StopWorker)
    }
}

#[cfg(test)]
#[path = "space_tests.rs"]
mod tests;
