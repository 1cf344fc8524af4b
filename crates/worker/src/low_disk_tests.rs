// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn below_threshold_with_stop_worker_trips() {
    let guard = LowDiskGuard::new(1_000, SpaceStrategy::StopWorker);
    assert!(guard.check(&FakeFreeSpaceProbe(500)));
}

#[test]
fn below_threshold_with_ignore_does_not_trip() {
    let guard = LowDiskGuard::new(1_000, SpaceStrategy::Ignore);
    assert!(!guard.check(&FakeFreeSpaceProbe(500)));
}

#[test]
fn above_threshold_never_trips() {
    let guard = LowDiskGuard::new(1_000, SpaceStrategy::StopWorker);
    assert!(!guard.check(&FakeFreeSpaceProbe(5_000)));
}
