// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cap_core::{FakeClock, Modality};
use cap_storage::{MeasurementStore, StoreConfig};
use cap_strategies::{CleaningStrategy, DistanceStrategy, SpaceStrategy};
use cap_wire::ProbeId;

use crate::source::fake::ChannelPlatform;

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

struct Harness {
    platform: Arc<ChannelPlatform>,
    store: SharedStore,
    to_tx: mpsc::Sender<ToWorker>,
    from_rx: mpsc::Receiver<FromWorker>,
    measurement_id: MeasurementId,
}

fn spawn_actor(dir: &tempfile::TempDir, low_disk_threshold_bytes: u64) -> Harness {
    let mut store = MeasurementStore::open(
        &dir.path().join("wal.jsonl"),
        &dir.path().join("snapshot.json"),
        StoreConfig::default(),
    )
    .unwrap();
    let measurement_id = store.new_measurement(Modality::Walking, 1, 0).unwrap();
    let store: SharedStore = Arc::new(parking_lot::Mutex::new(store));

    let platform = Arc::new(ChannelPlatform::new());
    let (to_tx, to_rx) = mpsc::channel(8);
    let (from_tx, from_rx) = mpsc::channel(64);

    let actor = WorkerActor::new(
        Arc::clone(&platform) as Arc<dyn SourceFactory>,
        Arc::clone(&store),
        Arc::new(StrategyRegistry::new()),
        FakeClock::new(),
        to_rx,
        from_tx,
        low_disk_threshold_bytes,
        11_000,
    );
    tokio::spawn(actor.run());

    Harness { platform, store, to_tx, from_rx, measurement_id }
}

async fn start(h: &mut Harness) {
    h.to_tx
        .send(ToWorker::Start {
            measurement_id: h.measurement_id,
            distance_strategy: DistanceStrategy::GreatCircle,
            cleaning_strategy: CleaningStrategy::default(),
            sensor_capture: SensorCapture::Disabled,
            space_strategy: SpaceStrategy::Ignore,
        })
        .await
        .unwrap();
    assert_eq!(h.from_rx.recv().await, Some(FromWorker::Started));
}

#[tokio::test]
async fn start_then_stop_acknowledges() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = spawn_actor(&dir, 0);
    start(&mut h).await;

    h.to_tx.send(ToWorker::Stop).await.unwrap();
    assert_eq!(h.from_rx.recv().await, Some(FromWorker::Stopped { stopped_successfully: true }));

    let store = h.store.lock();
    let m = store.load_measurement(h.measurement_id).unwrap();
    assert_eq!(m.status, cap_core::MeasurementStatus::Finished);
}

#[tokio::test]
async fn accepted_fix_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = spawn_actor(&dir, 0);
    start(&mut h).await;

    assert!(h.platform.push_fix(fix(0, 52.0, 4.0)));
    assert!(matches!(h.from_rx.recv().await, Some(FromWorker::LocationCaptured { .. })));

    h.to_tx.send(ToWorker::Stop).await.unwrap();
}

#[tokio::test]
async fn pause_releases_the_subscription_until_resume() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = spawn_actor(&dir, 0);
    start(&mut h).await;

    h.to_tx.send(ToWorker::Pause).await.unwrap();
    assert_eq!(h.from_rx.recv().await, Some(FromWorker::Paused));

    // Nobody is subscribed; these samples are lost, as on a real device.
    assert!(!h.platform.push_fix(fix(4_000, 52.0, 4.0)));
    assert!(!h.platform.push_fix(fix(5_000, 52.0, 4.0)));

    h.to_tx.send(ToWorker::Resume).await.unwrap();
    assert_eq!(h.from_rx.recv().await, Some(FromWorker::Resumed));

    assert!(h.platform.push_fix(fix(6_000, 52.0, 4.0)));
    assert!(matches!(h.from_rx.recv().await, Some(FromWorker::LocationCaptured { .. })));

    h.to_tx.send(ToWorker::Stop).await.unwrap();
}

#[tokio::test]
async fn stop_while_paused_reports_unsuccessful() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = spawn_actor(&dir, 0);
    start(&mut h).await;

    h.to_tx.send(ToWorker::Pause).await.unwrap();
    assert_eq!(h.from_rx.recv().await, Some(FromWorker::Paused));

    h.to_tx.send(ToWorker::Stop).await.unwrap();
    assert_eq!(h.from_rx.recv().await, Some(FromWorker::Stopped { stopped_successfully: false }));
}

#[tokio::test]
async fn revoked_permission_stops_itself() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = spawn_actor(&dir, 0);
    start(&mut h).await;

    h.platform.set_fine_location(false);
    assert!(h.platform.push_fix(fix(0, 52.0, 4.0)));

    assert_eq!(h.from_rx.recv().await, Some(FromWorker::MissingPermission));
    assert_eq!(
        h.from_rx.recv().await,
        Some(FromWorker::StoppedItself { reason: StopReason::PermissionRevoked })
    );
}

#[tokio::test(start_paused = true)]
async fn low_disk_stops_itself_on_the_next_tick() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = spawn_actor(&dir, 1_000_000);
    h.to_tx
        .send(ToWorker::Start {
            measurement_id: h.measurement_id,
            distance_strategy: DistanceStrategy::GreatCircle,
            cleaning_strategy: CleaningStrategy::default(),
            sensor_capture: SensorCapture::Disabled,
            space_strategy: SpaceStrategy::StopWorker,
        })
        .await
        .unwrap();
    assert_eq!(h.from_rx.recv().await, Some(FromWorker::Started));

    h.platform.set_free_bytes(10);
    assert_eq!(
        h.from_rx.recv().await,
        Some(FromWorker::StoppedItself { reason: StopReason::LowDiskSpace })
    );

    let store = h.store.lock();
    let m = store.load_measurement(h.measurement_id).unwrap();
    assert_eq!(m.status, cap_core::MeasurementStatus::Finished);
}

#[tokio::test]
async fn probe_before_start_is_answered() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = spawn_actor(&dir, 0);

    h.to_tx.send(ToWorker::Probe(ProbeId(7))).await.unwrap();
    assert_eq!(h.from_rx.recv().await, Some(FromWorker::Pong(ProbeId(7))));
}
