// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distance between two consecutive accepted fixes.

use cap_core::GeoLocation;
use serde::{Deserialize, Serialize};

use crate::registry::StrategyRegistry;

/// Mean Earth radius in meters, used by the haversine default.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// `DistanceCalculationStrategy(prev, next) -> meters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistanceStrategy {
    /// Great-circle distance between the two points (the default).
    GreatCircle,
    /// Resolved through a [`StrategyRegistry`] the host populates; falls
    /// back to `GreatCircle` if the name isn't registered.
    Custom { name: String },
}

impl Default for DistanceStrategy {
    fn default() -> Self {
        DistanceStrategy::GreatCircle
    }
}

impl DistanceStrategy {
    pub fn compute(&self, registry: &StrategyRegistry, prev: &GeoLocation, next: &GeoLocation) -> f64 {
        match self {
            DistanceStrategy::GreatCircle => great_circle_m(prev, next),
            DistanceStrategy::Custom { name } => match registry.distance(name) {
                Some(f) => f(prev, next),
                None => great_circle_m(prev, next),
            },
        }
    }
}

/// Haversine great-circle distance in meters.
fn great_circle_m(prev: &GeoLocation, next: &GeoLocation) -> f64 {
    let lat1 = prev.lat.to_radians();
    let lat2 = next.lat.to_radians();
    let dlat = (next.lat - prev.lat).to_radians();
    let dlon = (next.lon - prev.lon).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

#[cfg(test)]
#[path = "distance_tests.rs"]
mod tests;
