// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whether a location counts toward distance accumulation.

use cap_core::GeoLocation;
use serde::{Deserialize, Serialize};

use crate::registry::StrategyRegistry;

/// `LocationCleaningStrategy(loc) -> bool`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CleaningStrategy {
    /// Accept iff horizontal accuracy (when present) is below
    /// `max_horizontal_accuracy_m` and speed is non-negative.
    AccuracyThreshold { max_horizontal_accuracy_m: f64 },
    /// Resolved through a [`StrategyRegistry`]; falls back to
    /// `AccuracyThreshold` with the default threshold if unregistered.
    Custom { name: String },
}

impl Default for CleaningStrategy {
    fn default() -> Self {
        CleaningStrategy::AccuracyThreshold { max_horizontal_accuracy_m: 20.0 }
    }
}

impl CleaningStrategy {
    pub fn accepts(&self, registry: &StrategyRegistry, loc: &GeoLocation) -> bool {
        match self {
            CleaningStrategy::AccuracyThreshold { max_horizontal_accuracy_m } => {
                accuracy_threshold(loc, *max_horizontal_accuracy_m)
            }
            CleaningStrategy::Custom { name } => match registry.cleaning(name) {
                Some(f) => f(loc),
                None => accuracy_threshold(loc, Self::default().threshold_or_default()),
            },
        }
    }

    fn threshold_or_default(&self) -> f64 {
        match self {
            CleaningStrategy::AccuracyThreshold { max_horizontal_accuracy_m } => {
                *max_horizontal_accuracy_m
            }
            CleaningStrategy::Custom { .. } => 20.0,
        }
    }
}

fn accuracy_threshold(loc: &GeoLocation, max_horizontal_accuracy_m: f64) -> bool {
    if loc.speed_mps < 0.0 {
        return false;
    }
    match loc.horizontal_accuracy_m {
        Some(acc) => acc < max_horizontal_accuracy_m,
        None => true,
    }
}

#[cfg(test)]
#[path = "cleaning_tests.rs"]
mod tests;
