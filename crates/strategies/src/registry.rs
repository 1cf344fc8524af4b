// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named-key registry resolving `Custom` strategy variants to the
//! host's actual closures. Built-in variants never consult the registry.

use std::collections::HashMap;
use std::sync::Arc;

use cap_core::GeoLocation;

pub type DistanceFn = Arc<dyn Fn(&GeoLocation, &GeoLocation) -> f64 + Send + Sync>;
pub type CleaningFn = Arc<dyn Fn(&GeoLocation) -> bool + Send + Sync>;

/// Holds host-registered callbacks for `Custom` strategy variants.
///
/// Cloning is cheap (an `Arc` per entry); share one instance between the
/// Controller and the Worker task it spawns.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    distance: HashMap<String, DistanceFn>,
    cleaning: HashMap<String, CleaningFn>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_distance(&mut self, name: impl Into<String>, f: DistanceFn) {
        self.distance.insert(name.into(), f);
    }

    pub fn register_cleaning(&mut self, name: impl Into<String>, f: CleaningFn) {
        self.cleaning.insert(name.into(), f);
    }

    pub fn distance(&self, name: &str) -> Option<&DistanceFn> {
        self.distance.get(name)
    }

    pub fn cleaning(&self, name: &str) -> Option<&CleaningFn> {
        self.cleaning.get(name)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
