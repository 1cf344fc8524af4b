// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use std::sync::Arc;

use cap_core::Modality;
use cap_storage::{MeasurementStore, StoreConfig};

fn store_with_leftovers(dir: &tempfile::TempDir) -> (SharedStore, MeasurementId, MeasurementId) {
    let mut store = MeasurementStore::open(
        &dir.path().join("wal.jsonl"),
        &dir.path().join("snapshot.json"),
        StoreConfig::default(),
    )
    .unwrap();
    let open = store.new_measurement(Modality::Bicycle, 1, 0).unwrap();
    let paused = store.new_measurement(Modality::Car, 1, 0).unwrap();
    store.set_status(paused, MeasurementStatus::Paused).unwrap();
    (Arc::new(parking_lot::Mutex::new(store)), open, paused)
}

#[test]
fn scan_finds_open_and_paused() {
    let dir = tempfile::tempdir().unwrap();
    let (store, open, paused) = store_with_leftovers(&dir);

    let active = active_measurements(&store);
    assert_eq!(active.iter().map(|m| m.id).collect::<Vec<_>>(), vec![open, paused]);
}

#[test]
fn force_finish_clears_every_leftover() {
    let dir = tempfile::tempdir().unwrap();
    let (store, open, paused) = store_with_leftovers(&dir);

    let recovered = force_finish_active(&store).unwrap();
    assert_eq!(recovered, vec![open, paused]);
    assert!(active_measurements(&store).is_empty());

    let guard = store.lock();
    assert_eq!(guard.load_measurement(open).unwrap().status, MeasurementStatus::Finished);
    assert_eq!(guard.load_measurement(paused).unwrap().status, MeasurementStatus::Finished);
}

#[test]
fn force_finish_on_a_clean_store_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let store: SharedStore = Arc::new(parking_lot::Mutex::new(
        MeasurementStore::open(
            &dir.path().join("wal.jsonl"),
            &dir.path().join("snapshot.json"),
            StoreConfig::default(),
        )
        .unwrap(),
    ));
    assert!(force_finish_active(&store).unwrap().is_empty());
}
