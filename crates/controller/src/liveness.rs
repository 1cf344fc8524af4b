// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The liveness probe: a request/response exchange that decides whether a
//! worker is running, independent of whether a command is in flight.
//!
//! Each probe gets a fresh id and an entry in the slot map. The mutex around
//! the map is what serializes the timer/response race: whichever side
//! removes the slot first reports the outcome, and the loser finds the slot
//! gone and becomes a no-op. A pong carrying an id that is no longer in the
//! map is a stale response from an earlier probe and is ignored.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cap_wire::ProbeId;
use parking_lot::Mutex;
use tracing::debug;

/// The mutually exclusive result of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Running,
    TimedOut,
}

type ProbeCallback = Box<dyn FnOnce(ProbeOutcome) + Send>;

#[derive(Default)]
pub struct ProbeRegistry {
    next_id: AtomicU64,
    slots: Mutex<HashMap<ProbeId, ProbeCallback>>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a probe and hand back the id to tag the request with.
    pub fn begin(&self, on_outcome: ProbeCallback) -> ProbeId {
        let id = ProbeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.slots.lock().insert(id, on_outcome);
        id
    }

    /// Report an outcome for `id`. Returns `false` if the probe was already
    /// resolved (or never existed) and nothing happened.
    pub fn resolve(&self, id: ProbeId, outcome: ProbeOutcome) -> bool {
        let callback = self.slots.lock().remove(&id);
        match callback {
            Some(callback) => {
                callback(outcome);
                true
            }
            None => {
                debug!(probe_id = id.0, ?outcome, "ignoring stale probe outcome");
                false
            }
        }
    }

    /// Arm the timeout side of the race on a background task.
    pub fn arm_timer(self: Arc<Self>, id: ProbeId, timeout: Duration) {
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            self.resolve(id, ProbeOutcome::TimedOut);
        });
    }
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
