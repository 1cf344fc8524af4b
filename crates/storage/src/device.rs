// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! First-use generation and persistence of the device identifier.
//!
//! `DeviceId` is generated once and then read-only, so it lives
//! in its own one-line file next to the WAL rather than as a `StorageOp` —
//! replaying the WAL should never be able to change it.

use std::fs;
use std::path::Path;

use cap_core::DeviceId;

use crate::error::StorageError;

/// Load the device id from `path`, generating and persisting a new one on
/// first use.
pub fn load_or_create(path: &Path) -> Result<DeviceId, StorageError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(DeviceId::from_string(contents.trim())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let id = DeviceId::new();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
            }
            fs::write(path, id.as_str())
                .map_err(|source| StorageError::Io { path: path.to_path_buf(), source })?;
            Ok(id)
        }
        Err(source) => Err(StorageError::Io { path: path.to_path_buf(), source }),
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
