// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External sensor providers.
//!
//! The platform-specific GNSS/inertial/barometer APIs are out of scope; the
//! worker only needs something it can pull the next sample from. Each source
//! trait is pull-based rather than a `Stream` so a deterministic fake can
//! hand back exactly the sequence a test wants without spinning up an
//! executor-driven producer task.
//!
//! [`SourceFactory`] is the subscription seam: a handle returned by one of
//! its `open_*` methods stands for one live platform subscription, from START
//! or RESUME until the worker drops it on PAUSE/STOP. Samples the platform
//! produces while no handle is open are simply never seen, which is what
//! "release sensor subscriptions" means for a pull model.

use async_trait::async_trait;
use cap_core::SensorKind;
use cap_strategies::SensorCapture;

use crate::low_disk::FreeSpaceProbe;

/// A raw GNSS fix, not yet attached to a measurement id or range-validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFix {
    pub timestamp_ms: u64,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: Option<f64>,
    pub speed_mps: f64,
    pub horizontal_accuracy_m: Option<f64>,
    pub vertical_accuracy_m: Option<f64>,
}

/// A raw 3-axis inertial sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSensorSample {
    pub timestamp_ms: u64,
    pub kind: SensorKind,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A raw barometric reading, in hPa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPressureSample {
    pub timestamp_ms: u64,
    pub value_hpa: f64,
}

/// Whether fine location permission is currently granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

#[async_trait]
pub trait GnssSource: Send {
    /// Await the next fix, or `None` once the subscription is exhausted.
    async fn next_fix(&mut self) -> Option<RawFix>;

    /// Current permission state; checked once per fix so a mid-measurement
    /// revocation is noticed promptly.
    async fn permission(&self) -> PermissionState;
}

#[async_trait]
pub trait SensorSource: Send {
    async fn next_sample(&mut self) -> Option<RawSensorSample>;
}

#[async_trait]
pub trait PressureSource: Send {
    async fn next_sample(&mut self) -> Option<RawPressureSample>;
}

/// The device integration handed to the engine by the host: capability
/// checks plus per-subscription source handles.
///
/// `open_*` is called once per capture segment; the returned handle owns the
/// underlying platform listener and unregisters it on drop. A production
/// implementation wraps the platform location/sensor managers; tests use
/// [`fake::ChannelPlatform`].
pub trait SourceFactory: Send + Sync {
    /// Whether the fine-location capability is currently granted. Consulted
    /// by the controller before `start`/`resume` and never cached.
    fn fine_location_granted(&self) -> bool;

    fn open_gnss(&self) -> Box<dyn GnssSource>;

    /// Open the inertial streams at the rate the given capture mode asks
    /// for. Only called when the mode captures inertial data at all.
    fn open_sensors(&self, capture: &SensorCapture) -> Box<dyn SensorSource>;

    fn open_pressure(&self) -> Box<dyn PressureSource>;

    /// Probe for free space on the volume the engine persists to.
    fn open_free_space_probe(&self) -> Box<dyn FreeSpaceProbe>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    use super::*;

    /// A [`SourceFactory`] whose sources are fed by the test through push
    /// methods. Each `open_*` call starts a fresh channel, so samples pushed
    /// while no subscription is open are dropped — exactly the behavior of a
    /// platform producing samples nobody is listening to.
    #[derive(Default)]
    pub struct ChannelPlatform {
        fine_location: Arc<AtomicBool>,
        free_bytes: Arc<AtomicU64>,
        gnss_tx: Mutex<Option<mpsc::UnboundedSender<RawFix>>>,
        sensor_tx: Mutex<Option<mpsc::UnboundedSender<RawSensorSample>>>,
        pressure_tx: Mutex<Option<mpsc::UnboundedSender<RawPressureSample>>>,
    }

    impl ChannelPlatform {
        pub fn new() -> Self {
            let platform = Self::default();
            platform.fine_location.store(true, Ordering::SeqCst);
            platform.free_bytes.store(u64::MAX, Ordering::SeqCst);
            platform
        }

        pub fn set_fine_location(&self, granted: bool) {
            self.fine_location.store(granted, Ordering::SeqCst);
        }

        pub fn set_free_bytes(&self, bytes: u64) {
            self.free_bytes.store(bytes, Ordering::SeqCst);
        }

        /// Feed one fix to the current GNSS subscription. Returns `false` if
        /// no subscription is open (the sample is lost, as on a real device).
        pub fn push_fix(&self, fix: RawFix) -> bool {
            match self.gnss_tx.lock().as_ref() {
                Some(tx) => tx.send(fix).is_ok(),
                None => false,
            }
        }

        pub fn push_sensor(&self, sample: RawSensorSample) -> bool {
            match self.sensor_tx.lock().as_ref() {
                Some(tx) => tx.send(sample).is_ok(),
                None => false,
            }
        }

        pub fn push_pressure(&self, sample: RawPressureSample) -> bool {
            match self.pressure_tx.lock().as_ref() {
                Some(tx) => tx.send(sample).is_ok(),
                None => false,
            }
        }
    }

    impl SourceFactory for ChannelPlatform {
        fn fine_location_granted(&self) -> bool {
            self.fine_location.load(Ordering::SeqCst)
        }

        fn open_gnss(&self) -> Box<dyn GnssSource> {
            let (tx, rx) = mpsc::unbounded_channel();
            *self.gnss_tx.lock() = Some(tx);
            Box::new(ChannelGnss { rx, fine_location: Arc::clone(&self.fine_location) })
        }

        fn open_sensors(&self, _capture: &SensorCapture) -> Box<dyn SensorSource> {
            let (tx, rx) = mpsc::unbounded_channel();
            *self.sensor_tx.lock() = Some(tx);
            Box::new(ChannelSensors { rx })
        }

        fn open_pressure(&self) -> Box<dyn PressureSource> {
            let (tx, rx) = mpsc::unbounded_channel();
            *self.pressure_tx.lock() = Some(tx);
            Box::new(ChannelPressure { rx })
        }

        fn open_free_space_probe(&self) -> Box<dyn FreeSpaceProbe> {
            Box::new(SharedFreeSpace(Arc::clone(&self.free_bytes)))
        }
    }

    struct ChannelGnss {
        rx: mpsc::UnboundedReceiver<RawFix>,
        fine_location: Arc<AtomicBool>,
    }

    #[async_trait]
    impl GnssSource for ChannelGnss {
        async fn next_fix(&mut self) -> Option<RawFix> {
            self.rx.recv().await
        }

        async fn permission(&self) -> PermissionState {
            if self.fine_location.load(Ordering::SeqCst) {
                PermissionState::Granted
            } else {
                PermissionState::Denied
            }
        }
    }

    struct ChannelSensors {
        rx: mpsc::UnboundedReceiver<RawSensorSample>,
    }

    #[async_trait]
    impl SensorSource for ChannelSensors {
        async fn next_sample(&mut self) -> Option<RawSensorSample> {
            self.rx.recv().await
        }
    }

    struct ChannelPressure {
        rx: mpsc::UnboundedReceiver<RawPressureSample>,
    }

    #[async_trait]
    impl PressureSource for ChannelPressure {
        async fn next_sample(&mut self) -> Option<RawPressureSample> {
            self.rx.recv().await
        }
    }

    struct SharedFreeSpace(Arc<AtomicU64>);

    impl FreeSpaceProbe for SharedFreeSpace {
        fn free_bytes(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}
