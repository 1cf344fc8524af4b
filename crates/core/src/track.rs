// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Track reconstruction: the derived sub-sequence of a measurement's points
//! between a START/RESUME and the next PAUSE/STOP.
//!
//! Pure function over already-loaded data so both `cap-storage::load_track`
//! and any offline tool can reuse it without touching the store.

use crate::event::CaptureEvent;
use crate::geolocation::GeoLocation;
use crate::pressure::Pressure;

/// One maximal sub-sequence of a measurement between lifecycle boundaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSegment {
    pub start_timestamp_ms: u64,
    pub locations: Vec<GeoLocation>,
    pub pressures: Vec<Pressure>,
}

/// The full derived track for one measurement: an ordered list of segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub segments: Vec<TrackSegment>,
}

impl Track {
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.locations.is_empty() && s.pressures.is_empty())
    }

    pub fn location_count(&self) -> usize {
        self.segments.iter().map(|s| s.locations.len()).sum()
    }
}

/// Reconstruct a [`Track`] from a measurement's event log and its persisted
/// points. `events`, `locations`, and `pressures` must each already be
/// ordered by timestamp (the persistence contract guarantees this on read).
///
/// A measurement with zero locations and zero pressures still produces a
/// valid `Track` with one empty segment per START/RESUME boundary.
pub fn reconstruct(
    events: &[CaptureEvent],
    locations: &[GeoLocation],
    pressures: &[Pressure],
) -> Track {
    let mut segments = Vec::new();
    let mut current: Option<TrackSegment> = None;

    let mut loc_idx = 0usize;
    let mut pres_idx = 0usize;

    for event in events {
        if event.opens_segment() {
            // A prior open segment without an explicit close (shouldn't
            // happen for a well-formed event log) is flushed as-is.
            if let Some(seg) = current.take() {
                segments.push(seg);
            }
            current = Some(TrackSegment { start_timestamp_ms: event.timestamp_ms(), ..Default::default() });
        } else if event.closes_segment() {
            if let Some(mut seg) = current.take() {
                let boundary = event.timestamp_ms();
                while loc_idx < locations.len() && locations[loc_idx].timestamp_ms <= boundary {
                    seg.locations.push(locations[loc_idx]);
                    loc_idx += 1;
                }
                while pres_idx < pressures.len() && pressures[pres_idx].timestamp_ms <= boundary {
                    seg.pressures.push(pressures[pres_idx]);
                    pres_idx += 1;
                }
                segments.push(seg);
            }
        }
    }

    // A still-open segment (measurement currently OPEN/PAUSED) collects the
    // remaining points.
    if let Some(mut seg) = current.take() {
        seg.locations.extend(locations[loc_idx..].iter().copied());
        seg.pressures.extend(pressures[pres_idx..].iter().copied());
        segments.push(seg);
    }

    Track { segments }
}

#[cfg(test)]
#[path = "track_tests.rs"]
mod tests;
