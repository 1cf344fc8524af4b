// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Plain local configuration the host wires up before constructing the
//! engine: where state lives, batching and guard thresholds, and the default
//! strategies a `start` uses when the host doesn't override them. Loads from
//! a TOML file with per-field defaults, so a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cap_storage::StoreConfig;
use cap_strategies::{CleaningStrategy, DistanceStrategy, SensorCapture, SpaceStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ControllerError;

/// On-disk format tag stamped into every new measurement.
pub const FILE_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for the WAL, snapshot, and device id files.
    pub state_dir: PathBuf,
    /// Format tag for new measurements.
    pub file_format_version: u16,
    /// Maximum rows per persisted batch.
    pub batch_size: usize,
    /// Page size for paginated point reads.
    pub page_size: usize,
    /// Free-space floor below which the worker consults its space strategy.
    pub low_disk_threshold_bytes: u64,
    /// Gap after which a missing GNSS fix counts as lost.
    pub gnss_fix_inactivity_ms: u64,
    /// Deadline for the worker to acknowledge start/pause/resume/stop.
    pub command_timeout_ms: u64,
    pub distance_strategy: DistanceStrategy,
    pub cleaning_strategy: CleaningStrategy,
    pub sensor_capture: SensorCapture,
    pub space_strategy: SpaceStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            file_format_version: FILE_FORMAT_VERSION,
            batch_size: cap_storage::DEFAULT_BATCH_SIZE,
            page_size: cap_storage::DEFAULT_PAGE_SIZE,
            low_disk_threshold_bytes: 100 * 1024 * 1024,
            gnss_fix_inactivity_ms: cap_worker::DEFAULT_FIX_INACTIVITY_WINDOW_MS,
            command_timeout_ms: 10_000,
            distance_strategy: DistanceStrategy::default(),
            cleaning_strategy: CleaningStrategy::default(),
            sensor_capture: SensorCapture::default(),
            space_strategy: SpaceStrategy::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file; missing fields fall back to
    /// their defaults.
    pub fn load(path: &Path) -> Result<Self, ControllerError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ControllerError::Io { path: path.to_path_buf(), source })?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn wal_path(&self) -> PathBuf {
        self.state_dir.join("wal.jsonl")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir.join("snapshot.json")
    }

    pub fn device_path(&self) -> PathBuf {
        self.state_dir.join("device.id")
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig { batch_size: self.batch_size, page_size: self.page_size }
    }
}

/// `$XDG_STATE_HOME/cap` (or the platform equivalent), falling back to a
/// relative directory when no home is known.
fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("cap"))
        .unwrap_or_else(|| PathBuf::from(".cap"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
