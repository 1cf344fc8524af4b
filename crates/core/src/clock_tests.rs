// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_reports_a_plausible_epoch() {
    // Well past 2020-01-01 and never going backwards across calls.
    let t1 = SystemClock.epoch_ms();
    let t2 = SystemClock.epoch_ms();
    assert!(t1 > 1_577_836_800_000);
    assert!(t2 >= t1);
}

#[test]
fn fake_clock_set_and_advance() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(5_000);
    assert_eq!(clock.epoch_ms(), 5_000);

    clock.advance_ms(1_500);
    assert_eq!(clock.epoch_ms(), 6_500);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::new();
    let handle = clock.clone();
    handle.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}
