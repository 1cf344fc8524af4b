// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic compaction: a full [`MaterializedState`] snapshot tagged with the
//! WAL seq it covers, so recovery can skip straight to the tail of the log.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::MaterializedState;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

/// Load the snapshot at `path`, if one exists.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Writes snapshots to disk, tracking the seq of the last one taken so the
/// store knows when it's worth paying for another full serialize.
pub struct Checkpointer {
    path: PathBuf,
    last_snapshot_seq: u64,
}

impl Checkpointer {
    pub fn new(path: PathBuf, last_snapshot_seq: u64) -> Self {
        Self { path, last_snapshot_seq }
    }

    pub fn last_snapshot_seq(&self) -> u64 {
        self.last_snapshot_seq
    }

    pub fn write(&mut self, state: &MaterializedState, seq: u64, now: DateTime<Utc>) -> Result<(), SnapshotError> {
        let snapshot =
            Snapshot { version: CURRENT_SNAPSHOT_VERSION, seq, state: state.clone(), created_at: now };
        let tmp_path = self.path.with_extension("tmp");
        {
            let mut f = File::create(&tmp_path)?;
            f.write_all(&serde_json::to_vec(&snapshot)?)?;
            f.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        self.last_snapshot_seq = seq;
        Ok(())
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
