// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cap-worker: the capture pipeline that runs while a measurement is open.
//!
//! Owns the GNSS/inertial/barometer ingestion loop and the
//! worker side of the controller/worker wire protocol. The
//! controller spawns one [`actor::WorkerActor`] per active measurement and
//! talks to it exclusively through [`cap_wire::ToWorker`] /
//! [`cap_wire::FromWorker`].

pub mod actor;
pub mod batch;
pub mod gnss;
pub mod low_disk;
pub mod pipeline;
pub mod pressure;
pub mod sensors;
pub mod source;

pub use actor::{WorkerActor, DEFAULT_TICK_INTERVAL_MS};
pub use batch::{BoundedQueue, WriteItem};
pub use gnss::{FixTransition, GnssOutcome, GnssProcessor, DEFAULT_FIX_INACTIVITY_WINDOW_MS};
pub use low_disk::{FreeSpaceProbe, LowDiskGuard, StdFreeSpaceProbe};
pub use pipeline::{
    DrainStop, Pipeline, DEFAULT_PRESSURE_WINDOW_MS, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SENSOR_BATCH_CAPACITY,
};
pub use pressure::PressureAggregator;
pub use sensors::SensorBatcher;
pub use source::{
    GnssSource, PermissionState, PressureSource, RawFix, RawPressureSample, RawSensorSample,
    SensorSource, SourceFactory,
};

#[cfg(any(test, feature = "test-support"))]
pub use source::fake::ChannelPlatform;

#[cfg(any(test, feature = "test-support"))]
pub use low_disk::FakeFreeSpaceProbe;
