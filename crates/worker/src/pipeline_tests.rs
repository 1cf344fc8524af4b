// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cap_core::{Modality, SensorKind};
use cap_storage::StoreConfig;
use crate::low_disk::FakeFreeSpaceProbe;

fn pipeline(inactivity_window_ms: u64) -> (Pipeline, MeasurementStore, tempfile::TempDir, MeasurementId) {
    let dir = tempfile::tempdir().unwrap();
    let mut store = MeasurementStore::open(
        &dir.path().join("wal.jsonl"),
        &dir.path().join("snapshot.json"),
        StoreConfig::default(),
    )
    .unwrap();
    let id = store.new_measurement(Modality::Walking, 1, 0).unwrap();

    let pipeline = Pipeline::new(
        id,
        Arc::new(StrategyRegistry::new()),
        DistanceStrategy::GreatCircle,
        CleaningStrategy::AccuracyThreshold { max_horizontal_accuracy_m: 20.0 },
        SensorCapture::Enabled { frequency_hz: 50.0 },
        SpaceStrategy::Ignore,
        inactivity_window_ms,
        0,
    );
    (pipeline, store, dir, id)
}

fn fix(timestamp_ms: u64, lat: f64, lon: f64) -> RawFix {
    RawFix {
        timestamp_ms,
        lat,
        lon,
        altitude_m: None,
        speed_mps: 1.0,
        horizontal_accuracy_m: Some(5.0),
        vertical_accuracy_m: None,
    }
}

#[test]
fn accepted_fix_queues_a_location_and_updates_distance() {
    let (mut p, mut store, _dir, id) = pipeline(11_000);

    let events = p.on_fix(&mut store, fix(0, 52.0, 4.0));
    assert!(matches!(events[0], FromWorker::LocationCaptured { .. }));

    let events = p.on_fix(&mut store, fix(1_000, 52.001, 4.0));
    assert!(matches!(events[0], FromWorker::LocationCaptured { .. }));
    assert!(store.load_measurement(id).unwrap().distance_m > 0.0);
}

#[test]
fn inactivity_then_fix_emits_lost_then_acquired() {
    let (mut p, mut store, _dir, _id) = pipeline(1_000);
    p.on_fix(&mut store, fix(0, 52.0, 4.0));

    let lost = p.check_inactivity(5_000);
    assert!(matches!(lost, Some(FromWorker::GnssFixLost { .. })));

    let events = p.on_fix(&mut store, fix(5_500, 52.001, 4.0));
    assert!(events.iter().any(|e| matches!(e, FromWorker::GnssFixAcquired { .. })));
}

#[test]
fn sensor_batch_fills_and_queues() {
    let (mut p, _store, _dir, id) = pipeline(11_000);
    let sample = RawSensorSample { timestamp_ms: 0, kind: SensorKind::Acceleration, x: 0.0, y: 0.0, z: 9.8 };

    let mut emitted = None;
    for _ in 0..DEFAULT_SENSOR_BATCH_CAPACITY {
        if let Some(e) = p.on_sensor_sample(sample) {
            emitted = Some(e);
        }
    }
    match emitted {
        Some(FromWorker::SensorDataCaptured { points }) => {
            assert_eq!(points.len(), DEFAULT_SENSOR_BATCH_CAPACITY);
            assert_eq!(points[0].measurement_id, id);
        }
        _ => panic!("expected a full sensor batch"),
    }
}

#[test]
fn sensor_capture_disabled_drops_samples() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = MeasurementStore::open(
        &dir.path().join("wal.jsonl"),
        &dir.path().join("snapshot.json"),
        StoreConfig::default(),
    )
    .unwrap();
    let id = store.new_measurement(Modality::Walking, 1, 0).unwrap();
    let mut p = Pipeline::new(
        id,
        Arc::new(StrategyRegistry::new()),
        DistanceStrategy::GreatCircle,
        CleaningStrategy::default(),
        SensorCapture::Disabled,
        SpaceStrategy::Ignore,
        11_000,
        0,
    );
    let sample = RawSensorSample { timestamp_ms: 0, kind: SensorKind::Acceleration, x: 0.0, y: 0.0, z: 9.8 };
    assert!(p.on_sensor_sample(sample).is_none());
}

#[test]
fn low_disk_guard_stops_drain_with_reason() {
    let (mut p, mut store, _dir, _id) = pipeline(11_000);
    p.on_fix(&mut store, fix(0, 52.0, 4.0));
    p.low_disk = LowDiskGuard::new(1_000_000, SpaceStrategy::StopWorker);

    let result = p.drain_queue(&mut store, &FakeFreeSpaceProbe(10));
    assert_eq!(result, Err(DrainStop::LowDisk));
}

#[test]
fn drain_persists_queued_locations() {
    let (mut p, mut store, _dir, id) = pipeline(11_000);
    p.on_fix(&mut store, fix(0, 52.0, 4.0));

    p.drain_queue(&mut store, &FakeFreeSpaceProbe(u64::MAX)).unwrap();

    let pages: Vec<_> = store.load_locations_paged(id).collect();
    assert_eq!(pages.iter().map(|p| p.len()).sum::<usize>(), 1);
}
