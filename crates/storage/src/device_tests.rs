// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn first_use_generates_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("device_id");

    let id = load_or_create(&path).unwrap();
    assert!(path.exists());

    let reloaded = load_or_create(&path).unwrap();
    assert_eq!(id, reloaded);
}

#[test]
fn persisted_id_survives_whitespace() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("device_id");
    std::fs::write(&path, "dev-abc123\n").unwrap();

    let id = load_or_create(&path).unwrap();
    assert_eq!(id.as_str(), "dev-abc123");
}
