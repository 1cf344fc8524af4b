// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The lifecycle façade.
//!
//! One [`Controller`] per host process. `start`/`pause`/`resume`/`stop` are
//! serialized by a command mutex and validated against the persisted status
//! before anything is sent to the worker; `is_running`, `disconnect`, and
//! `reconnect` deliberately take no lock so they can be called while a
//! command is in flight (but never from inside a command callback).
//!
//! Completion handlers are delivered from the worker-event pump, after the
//! corresponding lifecycle event is durable. Each registered handler is
//! watched by a deadline task: if the worker never acknowledges, the handler
//! is discarded and a `WorkerStartTimeout`/`WorkerStopTimeout` error state
//! is broadcast instead, so a handler fires at most once per command.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cap_core::{
    CaptureError, CaptureEvent, Clock, DeviceId, Measurement, MeasurementId, MeasurementStatus,
    Modality, SystemClock, Track,
};
use cap_storage::{MeasurementStore, SharedStore};
use cap_strategies::{
    CleaningStrategy, DistanceStrategy, SensorCapture, SpaceStrategy, StrategyRegistry,
};
use cap_wire::{FromWorker, ToWorker};
use cap_worker::{SourceFactory, WorkerActor};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ControllerError;
use crate::events::{EventBus, HostEvent};
use crate::liveness::{ProbeOutcome, ProbeRegistry};
use crate::recovery;

/// Strategy and capture-mode choices for one measurement. [`Config`] supplies
/// the defaults; hosts override per start via
/// [`Controller::start_with_options`].
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub distance_strategy: DistanceStrategy,
    pub cleaning_strategy: CleaningStrategy,
    pub sensor_capture: SensorCapture,
    pub space_strategy: SpaceStrategy,
}

impl CaptureOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            distance_strategy: config.distance_strategy.clone(),
            cleaning_strategy: config.cleaning_strategy.clone(),
            sensor_capture: config.sensor_capture,
            space_strategy: config.space_strategy,
        }
    }
}

type CommandCallback = Box<dyn FnOnce(MeasurementId) + Send>;

/// One registered completion handler, tagged so its deadline task can tell
/// whether the slot it armed is still the one it finds.
struct PendingCommand {
    token: u64,
    measurement_id: MeasurementId,
    callback: CommandCallback,
}

#[derive(Default)]
struct Pending {
    on_started: Option<PendingCommand>,
    on_stopped: Option<PendingCommand>,
}

#[derive(Clone, Copy, PartialEq)]
enum Slot {
    Started,
    Stopped,
}

impl Pending {
    fn slot(&mut self, slot: Slot) -> &mut Option<PendingCommand> {
        match slot {
            Slot::Started => &mut self.on_started,
            Slot::Stopped => &mut self.on_stopped,
        }
    }
}

#[derive(Clone)]
struct WorkerLink {
    measurement_id: MeasurementId,
    to_worker: mpsc::Sender<ToWorker>,
}

pub struct Controller<C: Clock = SystemClock> {
    config: Config,
    store: SharedStore,
    registry: Arc<StrategyRegistry>,
    sources: Arc<dyn SourceFactory>,
    clock: C,
    device_id: DeviceId,
    bus: EventBus,
    /// Whether the host's event stream is attached; lifecycle-grade events
    /// (completion signal, errors) are delivered regardless.
    attached: Arc<AtomicBool>,
    command_lock: tokio::sync::Mutex<()>,
    link: Arc<Mutex<Option<WorkerLink>>>,
    probes: Arc<ProbeRegistry>,
    pending: Arc<Mutex<Pending>>,
    next_token: AtomicU64,
}

impl Controller<SystemClock> {
    /// Open (or create) the engine's state under `config.state_dir`.
    pub fn open(
        config: Config,
        sources: Arc<dyn SourceFactory>,
        registry: Arc<StrategyRegistry>,
    ) -> Result<Self, ControllerError> {
        Self::with_clock(config, sources, registry, SystemClock)
    }
}

impl<C: Clock + 'static> Controller<C> {
    pub fn with_clock(
        config: Config,
        sources: Arc<dyn SourceFactory>,
        registry: Arc<StrategyRegistry>,
        clock: C,
    ) -> Result<Self, ControllerError> {
        std::fs::create_dir_all(&config.state_dir)
            .map_err(|source| ControllerError::Io { path: config.state_dir.clone(), source })?;
        let device_id = cap_storage::load_or_create_device_id(&config.device_path())
            .map_err(CaptureError::from)?;
        let store = MeasurementStore::open(
            &config.wal_path(),
            &config.snapshot_path(),
            config.store_config(),
        )
        .map_err(CaptureError::from)?;
        let store: SharedStore = Arc::new(Mutex::new(store));

        let leftovers = recovery::active_measurements(&store);
        if !leftovers.is_empty() {
            warn!(
                count = leftovers.len(),
                "found measurements left open/paused by a previous run; the next start will recover them"
            );
        }

        Ok(Self {
            config,
            store,
            registry,
            sources,
            clock,
            device_id,
            bus: EventBus::new(256),
            attached: Arc::new(AtomicBool::new(true)),
            command_lock: tokio::sync::Mutex::new(()),
            link: Arc::new(Mutex::new(None)),
            probes: Arc::new(ProbeRegistry::new()),
            pending: Arc::new(Mutex::new(Pending::default())),
            next_token: AtomicU64::new(0),
        })
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribe to the engine's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.bus.subscribe()
    }

    fn default_options(&self) -> CaptureOptions {
        CaptureOptions::from_config(&self.config)
    }

    /// Begin a new measurement, recovering any leftovers a dead worker left
    /// behind first. `on_started` fires once the worker is up and its start
    /// event is durable; on success the new measurement id is also returned
    /// directly.
    pub async fn start(
        &self,
        modality: Modality,
        on_started: impl FnOnce(MeasurementId) + Send + 'static,
    ) -> Result<MeasurementId, CaptureError> {
        let options = self.default_options();
        self.start_with_options(modality, options, on_started).await
    }

    pub async fn start_with_options(
        &self,
        modality: Modality,
        options: CaptureOptions,
        on_started: impl FnOnce(MeasurementId) + Send + 'static,
    ) -> Result<MeasurementId, CaptureError> {
        let _guard = self.command_lock.lock().await;
        self.start_locked(modality, options, Box::new(on_started), true)
    }

    /// Like [`Controller::start`], but without the built-in recovery: if a
    /// previous run left a measurement OPEN/PAUSED this fails with
    /// `CorruptedMeasurement` and changes nothing.
    pub async fn try_start(
        &self,
        modality: Modality,
        on_started: impl FnOnce(MeasurementId) + Send + 'static,
    ) -> Result<MeasurementId, CaptureError> {
        let options = self.default_options();
        let _guard = self.command_lock.lock().await;
        self.start_locked(modality, options, Box::new(on_started), false)
    }

    fn start_locked(
        &self,
        modality: Modality,
        options: CaptureOptions,
        on_started: CommandCallback,
        recover: bool,
    ) -> Result<MeasurementId, CaptureError> {
        if !self.sources.fine_location_granted() {
            return Err(CaptureError::MissingPermission);
        }

        let live = self.link.lock().clone();
        if let Some(link) = live {
            // Already capturing: the second start is a no-op, and the worker
            // has long since signalled readiness.
            info!(measurement_id = link.measurement_id.get(), "start ignored; capture already active");
            on_started(link.measurement_id);
            return Ok(link.measurement_id);
        }

        if !recovery::active_measurements(&self.store).is_empty() {
            if !recover {
                return Err(CaptureError::CorruptedMeasurement);
            }
            warn!("recovering corrupted measurements before start");
            recovery::force_finish_active(&self.store)?;
        }

        self.launch(modality, options, on_started)
    }

    fn launch(
        &self,
        modality: Modality,
        options: CaptureOptions,
        on_started: CommandCallback,
    ) -> Result<MeasurementId, CaptureError> {
        let ts = self.clock.epoch_ms();
        let measurement_id = {
            let mut store = self.store.lock();
            let id = store
                .new_measurement(modality, self.config.file_format_version, ts)
                .map_err(CaptureError::from)?;
            store.flush().map_err(CaptureError::from)?;
            id
        };

        let (to_tx, to_rx) = mpsc::channel(32);
        let (from_tx, from_rx) = mpsc::channel(256);
        let actor = WorkerActor::new(
            Arc::clone(&self.sources),
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            self.clock.clone(),
            to_rx,
            from_tx,
            self.config.low_disk_threshold_bytes,
            self.config.gnss_fix_inactivity_ms,
        );
        tokio::spawn(actor.run());
        self.spawn_pump(measurement_id, from_rx);

        *self.link.lock() = Some(WorkerLink { measurement_id, to_worker: to_tx.clone() });
        self.register(Slot::Started, measurement_id, on_started, CaptureError::WorkerStartTimeout);

        let start = ToWorker::Start {
            measurement_id,
            distance_strategy: options.distance_strategy,
            cleaning_strategy: options.cleaning_strategy,
            sensor_capture: options.sensor_capture,
            space_strategy: options.space_strategy,
        };
        if to_tx.try_send(start).is_err() {
            // A failed start must leave no measurement row behind.
            *self.link.lock() = None;
            self.pending.lock().on_started = None;
            let mut store = self.store.lock();
            let _ = store.delete_measurement(measurement_id);
            let _ = store.flush();
            return Err(CaptureError::WorkerStartTimeout);
        }

        info!(measurement_id = measurement_id.get(), %modality, "measurement started");
        Ok(measurement_id)
    }

    /// Suspend the current OPEN measurement. The worker releases its sensor
    /// subscriptions but stays resident; `on_stopped` fires once the pause
    /// event is durable.
    pub async fn pause(
        &self,
        on_stopped: impl FnOnce(MeasurementId) + Send + 'static,
    ) -> Result<(), CaptureError> {
        let _guard = self.command_lock.lock().await;
        let (id, sender) = self.active_link()?;
        self.require_status(id, MeasurementStatus::Open)?;

        {
            let mut store = self.store.lock();
            store.set_status(id, MeasurementStatus::Paused).map_err(CaptureError::from)?;
            store.flush().map_err(CaptureError::from)?;
        }
        self.register(Slot::Stopped, id, Box::new(on_stopped), CaptureError::WorkerStopTimeout);
        if sender.try_send(ToWorker::Pause).is_err() {
            self.pending.lock().on_stopped = None;
            self.finish_without_worker(id)?;
            return Err(CaptureError::WorkerStopTimeout);
        }
        info!(measurement_id = id.get(), "measurement paused");
        Ok(())
    }

    /// Resume the current PAUSED measurement. If fine location has been
    /// revoked in the meantime, the measurement is forcibly closed as
    /// FINISHED before the error is surfaced.
    pub async fn resume(
        &self,
        on_started: impl FnOnce(MeasurementId) + Send + 'static,
    ) -> Result<(), CaptureError> {
        let _guard = self.command_lock.lock().await;
        let (id, sender) = self.active_link()?;
        self.require_status(id, MeasurementStatus::Paused)?;

        if !self.sources.fine_location_granted() {
            warn!(measurement_id = id.get(), "permission lost while paused; closing the measurement");
            let _ = sender.try_send(ToWorker::Stop);
            return Err(CaptureError::MissingPermission);
        }

        {
            let mut store = self.store.lock();
            store.set_status(id, MeasurementStatus::Open).map_err(CaptureError::from)?;
            store.flush().map_err(CaptureError::from)?;
        }
        self.register(Slot::Started, id, Box::new(on_started), CaptureError::WorkerStartTimeout);
        if sender.try_send(ToWorker::Resume).is_err() {
            self.pending.lock().on_started = None;
            self.finish_without_worker(id)?;
            return Err(CaptureError::WorkerStartTimeout);
        }
        info!(measurement_id = id.get(), "measurement resumed");
        Ok(())
    }

    /// Finish the current OPEN or PAUSED measurement. `on_stopped` fires once
    /// the stop event is durable and the status is FINISHED.
    pub async fn stop(
        &self,
        on_stopped: impl FnOnce(MeasurementId) + Send + 'static,
    ) -> Result<(), CaptureError> {
        let _guard = self.command_lock.lock().await;
        match self.active_link() {
            Ok((id, sender)) => {
                self.register(Slot::Stopped, id, Box::new(on_stopped), CaptureError::WorkerStopTimeout);
                if sender.try_send(ToWorker::Stop).is_err() {
                    // The worker died without clearing its link; close out
                    // here the way recovery would, unless it already did.
                    let callback = self.pending.lock().on_stopped.take();
                    *self.link.lock() = None;
                    let still_active = self
                        .store
                        .lock()
                        .load_measurement(id)
                        .is_some_and(|m| m.status.is_active());
                    if !still_active {
                        return Err(CaptureError::NoSuchMeasurement);
                    }
                    self.finish_without_worker(id)?;
                    if let Some(cmd) = callback {
                        (cmd.callback)(id);
                    }
                    self.bus.send(HostEvent::ServiceStopped {
                        measurement_id: id,
                        stopped_successfully: false,
                    });
                }
                info!(measurement_id = id.get(), "measurement stopping");
                Ok(())
            }
            Err(_) => {
                // No live worker, but a crash can still have left an active
                // row behind; stopping that is a valid host request.
                let id = recovery::active_measurements(&self.store)
                    .first()
                    .map(|m| m.id)
                    .ok_or(CaptureError::NoSuchMeasurement)?;
                self.finish_without_worker(id)?;
                on_stopped(id);
                self.bus.send(HostEvent::ServiceStopped {
                    measurement_id: id,
                    stopped_successfully: false,
                });
                Ok(())
            }
        }
    }

    /// Record a transport change for the current measurement: the row is
    /// updated and a modality-change event joins the lifecycle log.
    pub async fn change_modality(&self, modality: Modality) -> Result<(), CaptureError> {
        let _guard = self.command_lock.lock().await;
        let id = recovery::active_measurements(&self.store)
            .first()
            .map(|m| m.id)
            .ok_or(CaptureError::NoSuchMeasurement)?;
        let ts = self.clock.epoch_ms();
        let mut store = self.store.lock();
        store
            .append_event(
                id,
                CaptureEvent::ModalityTypeChange { measurement_id: id, timestamp_ms: ts, modality },
            )
            .map_err(CaptureError::from)?;
        store.set_modality(id, modality).map_err(CaptureError::from)?;
        store.flush().map_err(CaptureError::from)?;
        info!(measurement_id = id.get(), %modality, "modality changed");
        Ok(())
    }

    /// Probe whether a worker is currently running. Non-blocking; the
    /// outcome arrives on `on_outcome` either when the worker answers or
    /// when `timeout` elapses, whichever is first.
    pub fn is_running(
        &self,
        timeout: Duration,
        on_outcome: impl FnOnce(ProbeOutcome) + Send + 'static,
    ) {
        let id = self.probes.begin(Box::new(on_outcome));
        if let Some(link) = &*self.link.lock() {
            let _ = link.to_worker.try_send(ToWorker::Probe(id));
        }
        Arc::clone(&self.probes).arm_timer(id, timeout);
    }

    /// [`Controller::is_running`] as a future, for hosts that prefer awaiting.
    pub async fn is_running_async(&self, timeout: Duration) -> ProbeOutcome {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.is_running(timeout, move |outcome| {
            let _ = tx.send(outcome);
        });
        rx.await.unwrap_or(ProbeOutcome::TimedOut)
    }

    /// Detach the host's event stream without affecting the worker. Capture,
    /// persistence, and the completion signal continue.
    pub fn disconnect(&self) {
        self.attached.store(false, Ordering::SeqCst);
        info!("event stream detached");
    }

    /// Probe the worker and, if it is alive, re-attach the event stream.
    pub async fn reconnect(&self, timeout: Duration) -> ProbeOutcome {
        let outcome = self.is_running_async(timeout).await;
        if outcome == ProbeOutcome::Running {
            self.attached.store(true, Ordering::SeqCst);
            info!("event stream reattached");
        }
        outcome
    }

    /// All measurements, or just those in `status`, ordered by id.
    pub fn load_measurements(&self, status: Option<MeasurementStatus>) -> Vec<Measurement> {
        let store = self.store.lock();
        match status {
            Some(status) => store.load_measurements_by_status(status),
            None => store.load_measurements(),
        }
    }

    pub fn load_measurement(&self, id: MeasurementId) -> Option<Measurement> {
        self.store.lock().load_measurement(id)
    }

    pub fn load_track(&self, id: MeasurementId) -> Result<Track, CaptureError> {
        let store = self.store.lock();
        store.load_measurement(id).ok_or(CaptureError::NoSuchMeasurement)?;
        Ok(store.load_track(id))
    }

    /// Delete a measurement and everything it owns. The currently active
    /// measurement cannot be deleted; stop it first.
    pub fn delete_measurement(&self, id: MeasurementId) -> Result<(), CaptureError> {
        let mut store = self.store.lock();
        let measurement = store.load_measurement(id).ok_or(CaptureError::NoSuchMeasurement)?;
        if measurement.status.is_active() {
            return Err(CaptureError::InvalidLifecycleTransition {
                from: measurement.status.to_string(),
                to: "deleted".to_string(),
            });
        }
        store.delete_measurement(id).map_err(CaptureError::from)?;
        store.flush().map_err(CaptureError::from)?;
        info!(measurement_id = id.get(), "measurement deleted");
        Ok(())
    }

    /// The uploader-facing hook: records a confirmed transfer by moving the
    /// measurement from FINISHED to SYNCED.
    pub fn mark_synced(&self, id: MeasurementId) -> Result<(), CaptureError> {
        let mut store = self.store.lock();
        store.mark_synced(id).map_err(CaptureError::from)?;
        store.flush().map_err(CaptureError::from)?;
        Ok(())
    }

    fn active_link(&self) -> Result<(MeasurementId, mpsc::Sender<ToWorker>), CaptureError> {
        self.link
            .lock()
            .as_ref()
            .map(|link| (link.measurement_id, link.to_worker.clone()))
            .ok_or(CaptureError::NoSuchMeasurement)
    }

    fn require_status(&self, id: MeasurementId, expected: MeasurementStatus) -> Result<(), CaptureError> {
        let status = self
            .store
            .lock()
            .load_measurement(id)
            .ok_or(CaptureError::NoSuchMeasurement)?
            .status;
        if status != expected {
            return Err(CaptureError::NoSuchMeasurement);
        }
        Ok(())
    }

    /// Close out an active measurement whose worker is gone: append the stop
    /// event, mark it finished, flush.
    fn finish_without_worker(&self, id: MeasurementId) -> Result<(), CaptureError> {
        let ts = self.clock.epoch_ms();
        let mut store = self.store.lock();
        store
            .append_event(id, CaptureEvent::LifecycleStop { measurement_id: id, timestamp_ms: ts })
            .map_err(CaptureError::from)?;
        store.set_status(id, MeasurementStatus::Finished).map_err(CaptureError::from)?;
        store.flush().map_err(CaptureError::from)?;
        Ok(())
    }

    /// Park `callback` until the worker acknowledges, with a deadline task
    /// that discards it and broadcasts `timeout_error` if it never does.
    fn register(
        &self,
        slot: Slot,
        measurement_id: MeasurementId,
        callback: CommandCallback,
        timeout_error: CaptureError,
    ) {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        *self.pending.lock().slot(slot) = Some(PendingCommand { token, measurement_id, callback });

        let pending = Arc::clone(&self.pending);
        let bus = self.bus.clone();
        let timeout = self.config.command_timeout();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let expired = {
                let mut pending = pending.lock();
                let armed = pending.slot(slot).as_ref().map_or(false, |cmd| cmd.token == token);
                if armed {
                    pending.slot(slot).take()
                } else {
                    None
                }
            };
            if let Some(cmd) = expired {
                error!(
                    measurement_id = cmd.measurement_id.get(),
                    "worker did not acknowledge the command in time"
                );
                bus.send(HostEvent::ErrorState { error: timeout_error });
            }
        });
    }

    /// Forward worker messages to the host bus, resolve probe pongs, fire
    /// parked completion handlers, and keep the link/current-measurement
    /// state in step with what the worker reports.
    fn spawn_pump(&self, measurement_id: MeasurementId, mut from_rx: mpsc::Receiver<FromWorker>) {
        let bus = self.bus.clone();
        let probes = Arc::clone(&self.probes);
        let pending = Arc::clone(&self.pending);
        let link = Arc::clone(&self.link);
        let attached = Arc::clone(&self.attached);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            while let Some(message) = from_rx.recv().await {
                match message {
                    FromWorker::Pong(id) => {
                        probes.resolve(id, ProbeOutcome::Running);
                    }
                    FromWorker::Started | FromWorker::Resumed => {
                        if let Some(cmd) = pending.lock().on_started.take() {
                            (cmd.callback)(cmd.measurement_id);
                        }
                        bus.send(HostEvent::ServiceStarted { measurement_id });
                    }
                    FromWorker::Paused => {
                        if let Some(cmd) = pending.lock().on_stopped.take() {
                            (cmd.callback)(cmd.measurement_id);
                        }
                    }
                    FromWorker::Stopped { stopped_successfully } => {
                        *link.lock() = None;
                        if let Some(cmd) = pending.lock().on_stopped.take() {
                            (cmd.callback)(cmd.measurement_id);
                        }
                        bus.send(HostEvent::ServiceStopped { measurement_id, stopped_successfully });
                        compact_after_finish(&store, measurement_id);
                    }
                    FromWorker::StoppedItself { reason } => {
                        *link.lock() = None;
                        bus.send(HostEvent::ServiceStoppedItself { measurement_id, reason });
                        bus.send(HostEvent::ServiceStopped {
                            measurement_id,
                            stopped_successfully: false,
                        });
                        compact_after_finish(&store, measurement_id);
                    }
                    FromWorker::MissingPermission => {
                        bus.send(HostEvent::MissingPermission { measurement_id });
                    }
                    FromWorker::ErrorState { error } => {
                        error!(error = %error, "worker reported an error state");
                        bus.send(HostEvent::ErrorState { error });
                    }
                    FromWorker::LocationCaptured { location } => {
                        if attached.load(Ordering::SeqCst) {
                            bus.send(HostEvent::LocationCaptured { location });
                        }
                    }
                    FromWorker::SensorDataCaptured { points } => {
                        if attached.load(Ordering::SeqCst) {
                            bus.send(HostEvent::SensorDataCaptured { points });
                        }
                    }
                    FromWorker::GnssFixAcquired { timestamp_ms } => {
                        if attached.load(Ordering::SeqCst) {
                            bus.send(HostEvent::GnssFixAcquired { timestamp_ms });
                        }
                    }
                    FromWorker::GnssFixLost { timestamp_ms } => {
                        if attached.load(Ordering::SeqCst) {
                            bus.send(HostEvent::GnssFixLost { timestamp_ms });
                        }
                    }
                }
            }
        });
    }
}

/// A finished trip is a natural compaction point: fold the WAL into a fresh
/// snapshot so startup replay stays bounded.
fn compact_after_finish(store: &SharedStore, measurement_id: MeasurementId) {
    if let Err(e) = store.lock().compact() {
        warn!(measurement_id = measurement_id.get(), error = %e, "post-measurement compaction failed");
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
