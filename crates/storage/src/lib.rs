// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cap-storage: event-sourced persistence for the capture engine.
//!
//! A [`Wal`] of [`StorageOp`]s is the durable source of truth; a
//! [`MaterializedState`] is rebuilt from it on open and kept in sync as new
//! ops are written. [`MeasurementStore`] is the facade everything else talks
//! to — it owns the WAL, the state, and periodic snapshot compaction.

use std::sync::Arc;

mod device;
mod error;
mod op;
mod snapshot;
mod state;
mod store;
mod wal;

pub use device::load_or_create as load_or_create_device_id;
pub use error::StorageError;
pub use op::StorageOp;
pub use snapshot::{load_snapshot, Checkpointer, Snapshot, CURRENT_SNAPSHOT_VERSION};
pub use state::MaterializedState;
pub use store::{MeasurementStore, StoreConfig, DEFAULT_BATCH_SIZE, DEFAULT_PAGE_SIZE};
pub use wal::{Wal, WalEntry, WalError, FLUSH_THRESHOLD};

/// The store handle shared between the controller and the worker task it
/// spawns. Reads taken while the worker holds the lock wait rather than
/// observing a partial batch.
pub type SharedStore = Arc<parking_lot::Mutex<MeasurementStore>>;
