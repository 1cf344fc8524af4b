// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synthetic device integration for the demo command.
//!
//! Generates a plausible walk: 1 Hz GNSS fixes drifting north, barometer
//! samples at 5 Hz around sea-level pressure, and inertial samples at the
//! rate the capture mode asks for. Good enough to watch the pipeline do its
//! thing without a phone attached.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::oneshot;

use cap_controller::{Controller, HostEvent};
use cap_core::{Modality, SensorKind};
use cap_strategies::SensorCapture;
use cap_worker::{
    FreeSpaceProbe, GnssSource, PermissionState, PressureSource, RawFix, RawPressureSample,
    RawSensorSample, SensorSource, SourceFactory, StdFreeSpaceProbe,
};

pub struct DemoPlatform {
    state_dir: PathBuf,
}

impl DemoPlatform {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }
}

impl SourceFactory for DemoPlatform {
    fn fine_location_granted(&self) -> bool {
        true
    }

    fn open_gnss(&self) -> Box<dyn GnssSource> {
        Box::new(DemoGnss { step: 0 })
    }

    fn open_sensors(&self, capture: &SensorCapture) -> Box<dyn SensorSource> {
        let frequency_hz = match capture {
            SensorCapture::Enabled { frequency_hz } => *frequency_hz,
            SensorCapture::Disabled => 0.0,
        };
        let interval_ms = if frequency_hz > 0.0 { (1_000.0 / frequency_hz) as u64 } else { u64::MAX };
        Box::new(DemoSensors { step: 0, interval_ms: interval_ms.max(1) })
    }

    fn open_pressure(&self) -> Box<dyn PressureSource> {
        Box::new(DemoPressure { step: 0 })
    }

    fn open_free_space_probe(&self) -> Box<dyn FreeSpaceProbe> {
        Box::new(StdFreeSpaceProbe::new(self.state_dir.clone()))
    }
}

fn epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

struct DemoGnss {
    step: u64,
}

#[async_trait]
impl GnssSource for DemoGnss {
    async fn next_fix(&mut self) -> Option<RawFix> {
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        self.step += 1;
        Some(RawFix {
            timestamp_ms: epoch_ms(),
            lat: 52.0 + self.step as f64 * 1.2e-5,
            lon: 4.0,
            altitude_m: Some(10.0),
            speed_mps: 1.3,
            horizontal_accuracy_m: Some(4.0),
            vertical_accuracy_m: Some(6.0),
        })
    }

    async fn permission(&self) -> PermissionState {
        PermissionState::Granted
    }
}

struct DemoSensors {
    step: u64,
    interval_ms: u64,
}

#[async_trait]
impl SensorSource for DemoSensors {
    async fn next_sample(&mut self) -> Option<RawSensorSample> {
        tokio::time::sleep(Duration::from_millis(self.interval_ms)).await;
        self.step += 1;
        let kind = match self.step % 3 {
            0 => SensorKind::Acceleration,
            1 => SensorKind::Rotation,
            _ => SensorKind::Direction,
        };
        let wobble = (self.step as f64 * 0.7).sin() * 0.2;
        Some(RawSensorSample { timestamp_ms: epoch_ms(), kind, x: wobble, y: -wobble, z: 9.81 })
    }
}

struct DemoPressure {
    step: u64,
}

#[async_trait]
impl PressureSource for DemoPressure {
    async fn next_sample(&mut self) -> Option<RawPressureSample> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        self.step += 1;
        let value_hpa = 1_013.25 + (self.step as f64 * 0.1).sin() * 0.5;
        Some(RawPressureSample { timestamp_ms: epoch_ms(), value_hpa })
    }
}

/// Drive a full start/pause/resume/stop cycle against the synthetic
/// platform, narrating the event stream as it goes.
pub async fn run(controller: &Controller, modality: Modality, seconds: u64) -> Result<()> {
    let mut events = controller.subscribe();
    let narrator = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                HostEvent::LocationCaptured { location } => {
                    println!("  fix    lat={:.5} lon={:.5} ±{:?}m", location.lat, location.lon, location.horizontal_accuracy_m);
                }
                HostEvent::SensorDataCaptured { points } => {
                    println!("  sensor batch of {} points", points.len());
                }
                HostEvent::GnssFixAcquired { .. } => println!("  gnss fix acquired"),
                HostEvent::GnssFixLost { .. } => println!("  gnss fix lost"),
                HostEvent::ServiceStoppedItself { reason, .. } => {
                    println!("  worker stopped itself: {reason:?}");
                }
                HostEvent::ErrorState { error } => println!("  error: {error}"),
                HostEvent::ServiceStopped { measurement_id, stopped_successfully } => {
                    println!("  measurement {measurement_id} finished (clean: {stopped_successfully})");
                    break;
                }
                _ => {}
            }
        }
    });

    let (tx, rx) = oneshot::channel();
    let id = controller
        .start(modality, move |id| {
            let _ = tx.send(id);
        })
        .await?;
    rx.await?;
    println!("measurement {id} started ({modality})");

    let half = Duration::from_secs(seconds.div_ceil(2));
    tokio::time::sleep(half).await;

    let (tx, rx) = oneshot::channel();
    controller
        .pause(move |id| {
            let _ = tx.send(id);
        })
        .await?;
    rx.await?;
    println!("paused; waiting two seconds");
    tokio::time::sleep(Duration::from_secs(2)).await;

    let (tx, rx) = oneshot::channel();
    controller
        .resume(move |id| {
            let _ = tx.send(id);
        })
        .await?;
    rx.await?;
    println!("resumed");
    tokio::time::sleep(half).await;

    let (tx, rx) = oneshot::channel();
    controller
        .stop(move |id| {
            let _ = tx.send(id);
        })
        .await?;
    rx.await?;
    narrator.await?;

    let measurement = controller
        .load_measurement(id)
        .ok_or_else(|| anyhow::anyhow!("measurement {id} vanished"))?;
    let track = controller.load_track(id)?;
    println!(
        "done: {:.1} m over {} locations in {} segments",
        measurement.distance_m,
        track.location_count(),
        track.segments.len()
    );
    Ok(())
}
