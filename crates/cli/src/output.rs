// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-text rendering for the list/track commands.

use anyhow::Result;

use cap_controller::Controller;
use cap_core::{MeasurementId, MeasurementStatus};

pub fn list(controller: &Controller, status: Option<MeasurementStatus>) {
    let measurements = controller.load_measurements(status);
    if measurements.is_empty() {
        println!("no measurements");
        return;
    }
    println!("{:>6}  {:<10}  {:<10}  {:>12}  {:>14}", "id", "status", "modality", "distance", "started");
    for m in measurements {
        println!(
            "{:>6}  {:<10}  {:<10}  {:>10.1} m  {:>14}",
            m.id, m.status, m.modality, m.distance_m, m.start_timestamp_ms
        );
    }
}

pub fn track(controller: &Controller, id: MeasurementId) -> Result<()> {
    let track = controller.load_track(id)?;
    if track.is_empty() {
        println!("measurement {id}: empty track");
        return Ok(());
    }
    for (n, segment) in track.segments.iter().enumerate() {
        println!(
            "segment {} (from t={}): {} locations, {} pressure readings",
            n + 1,
            segment.start_timestamp_ms,
            segment.locations.len(),
            segment.pressures.len()
        );
        for location in &segment.locations {
            println!("  t={} lat={:.6} lon={:.6} v={:.2}", location.timestamp_ms, location.lat, location.lon, location.speed_mps);
        }
    }
    Ok(())
}
