// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GNSS fix processing: range validation, cleaning, distance accumulation
//!, and edge-triggered fix-lost/acquired tracking.

use cap_core::{CaptureError, GeoLocation, MeasurementId};
use cap_strategies::{CleaningStrategy, DistanceStrategy, StrategyRegistry};

use crate::source::RawFix;

/// Default gap, in milliseconds, after which a missing fix counts as lost.
pub const DEFAULT_FIX_INACTIVITY_WINDOW_MS: u64 = 11_000;

pub enum GnssOutcome {
    /// Cleaning strategy accepted the fix; `distance_delta_m` has already
    /// been added to the processor's running total.
    Accepted { location: GeoLocation, distance_delta_m: f64 },
    /// In range but rejected by the cleaning strategy; still persisted,
    /// just not distance-accumulated.
    Rejected { location: GeoLocation },
    /// Out of range; not persisted as a location at all.
    Invalid(CaptureError),
}

pub struct GnssProcessor {
    distance_strategy: DistanceStrategy,
    cleaning_strategy: CleaningStrategy,
    last_accepted: Option<GeoLocation>,
    total_distance_m: f64,
    last_fix_at_ms: Option<u64>,
    fix_currently_lost: bool,
    inactivity_window_ms: u64,
}

/// Edge-triggered transition on the GNSS fix stream; only emitted when the
/// state actually flips, not on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixTransition {
    Acquired,
    Lost,
}

impl GnssProcessor {
    pub fn new(
        distance_strategy: DistanceStrategy,
        cleaning_strategy: CleaningStrategy,
        inactivity_window_ms: u64,
    ) -> Self {
        Self {
            distance_strategy,
            cleaning_strategy,
            last_accepted: None,
            total_distance_m: 0.0,
            last_fix_at_ms: None,
            // Starts "lost" so the very first fix reports an acquired edge.
            fix_currently_lost: true,
            inactivity_window_ms,
        }
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    /// Range-validate, clean, and (if accepted) accumulate distance for one
    /// fix. A fix arriving at all means GNSS is alive again regardless of
    /// whether the cleaning strategy accepts it, so this also returns an
    /// acquired-edge transition when the stream had previously been marked lost.
    pub fn process(
        &mut self,
        registry: &StrategyRegistry,
        measurement_id: MeasurementId,
        fix: RawFix,
    ) -> (GnssOutcome, Option<FixTransition>) {
        self.last_fix_at_ms = Some(fix.timestamp_ms);
        let was_lost = self.fix_currently_lost;
        self.fix_currently_lost = false;
        let transition = was_lost.then_some(FixTransition::Acquired);

        let mut location = match GeoLocation::new(
            measurement_id,
            fix.timestamp_ms,
            fix.lat,
            fix.lon,
            fix.altitude_m,
            fix.speed_mps,
            fix.horizontal_accuracy_m,
            fix.vertical_accuracy_m,
        ) {
            Ok(location) => location,
            Err(e) => return (GnssOutcome::Invalid(e), transition),
        };

        if !self.cleaning_strategy.accepts(registry, &location) {
            return (GnssOutcome::Rejected { location }, transition);
        }
        location.valid = true;

        let distance_delta_m = match &self.last_accepted {
            Some(prev) => self.distance_strategy.compute(registry, prev, &location),
            None => 0.0,
        };
        self.total_distance_m += distance_delta_m;
        self.last_accepted = Some(location);

        (GnssOutcome::Accepted { location, distance_delta_m }, transition)
    }

    /// Called on a periodic tick (independent of fix arrival) to detect a
    /// fix-lost edge once `inactivity_window_ms` has elapsed with no fix.
    pub fn check_inactivity(&mut self, now_ms: u64) -> Option<FixTransition> {
        let last = self.last_fix_at_ms?;
        if self.fix_currently_lost {
            return None;
        }
        if now_ms.saturating_sub(last) >= self.inactivity_window_ms {
            self.fix_currently_lost = true;
            return Some(FixTransition::Lost);
        }
        None
    }
}

#[cfg(test)]
#[path = "gnss_tests.rs"]
mod tests;
