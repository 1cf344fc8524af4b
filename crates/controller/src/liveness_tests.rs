// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use std::sync::atomic::AtomicUsize;

use tokio::sync::oneshot;

#[tokio::test(start_paused = true)]
async fn timer_reports_timed_out_when_no_pong_arrives() {
    let registry = Arc::new(ProbeRegistry::new());
    let (tx, rx) = oneshot::channel();
    let id = registry.begin(Box::new(move |outcome| {
        let _ = tx.send(outcome);
    }));
    Arc::clone(&registry).arm_timer(id, Duration::from_secs(1));

    assert_eq!(rx.await.unwrap(), ProbeOutcome::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn pong_wins_and_the_late_timer_is_a_noop() {
    let registry = Arc::new(ProbeRegistry::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();

    let calls_in_cb = Arc::clone(&calls);
    let id = registry.begin(Box::new(move |outcome| {
        calls_in_cb.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(outcome);
    }));

    assert!(registry.resolve(id, ProbeOutcome::Running));
    Arc::clone(&registry).arm_timer(id, Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(rx.await.unwrap(), ProbeOutcome::Running);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stale_pong_from_an_earlier_probe_is_ignored() {
    let registry = Arc::new(ProbeRegistry::new());
    assert!(!registry.resolve(ProbeId(42), ProbeOutcome::Running));
}

#[tokio::test]
async fn ids_are_never_reused_within_a_registry() {
    let registry = Arc::new(ProbeRegistry::new());
    let a = registry.begin(Box::new(|_| {}));
    let b = registry.begin(Box::new(|_| {}));
    assert_ne!(a, b);
}
