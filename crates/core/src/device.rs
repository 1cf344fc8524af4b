// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device identifier: an opaque, stable id generated once per device.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for the device the engine runs on.
///
/// Generated once on first use and persisted by `cap-storage::device`;
/// read-only thereafter. The value is `dev-` followed by a random nanoid and
/// carries no meaning beyond uniqueness — it exists so captured measurements
/// can be attributed to a device without any account or hardware serial
/// involved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub const PREFIX: &'static str = "dev-";

    /// Generate a fresh random id. Called exactly once per device, on first
    /// use; every later run reads the persisted value back instead.
    pub fn new() -> Self {
        Self(format!("{}{}", Self::PREFIX, nanoid::nanoid!()))
    }

    /// Rehydrate an id previously produced by [`DeviceId::new`]. Trusts its
    /// input; the persisted file is owned by the engine.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
