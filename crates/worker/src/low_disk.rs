// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Free-space guard: when available space on
//! the storage volume drops below a threshold, the active [`SpaceStrategy`]
//! decides whether the worker should stop itself.

use cap_strategies::SpaceStrategy;

pub trait FreeSpaceProbe: Send {
    /// Bytes currently free on the volume holding the WAL/snapshot files.
    fn free_bytes(&self) -> u64;
}

pub struct StdFreeSpaceProbe {
    path: std::path::PathBuf,
}

impl StdFreeSpaceProbe {
    pub fn new(path: std::path::PathBuf) -> Self {
        Self { path }
    }
}

impl FreeSpaceProbe for StdFreeSpaceProbe {
    fn free_bytes(&self) -> u64 {
        fs2::available_space(&self.path).unwrap_or(u64::MAX)
    }
}

/// Checks free space against `threshold_bytes` and asks the configured
/// [`SpaceStrategy`] what to do about it.
pub struct LowDiskGuard {
    threshold_bytes: u64,
    space_strategy: SpaceStrategy,
}

impl LowDiskGuard {
    pub fn new(threshold_bytes: u64, space_strategy: SpaceStrategy) -> Self {
        Self { threshold_bytes, space_strategy }
    }

    /// Returns `true` if the worker should stop itself right now.
    pub fn check(&self, probe: &dyn FreeSpaceProbe) -> bool {
        probe.free_bytes() < self.threshold_bytes && self.space_strategy.should_stop()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct FakeFreeSpaceProbe(pub u64);

#[cfg(any(test, feature = "test-support"))]
impl FreeSpaceProbe for FakeFreeSpaceProbe {
    fn free_bytes(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
#[path = "low_disk_tests.rs"]
mod tests;
