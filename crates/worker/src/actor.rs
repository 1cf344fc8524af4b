// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker's message loop: receives [`ToWorker`] commands from the
//! controller, pulls from the GNSS/inertial/barometer subscriptions, and
//! drives [`Pipeline`] end to end.
//!
//! Modeled as a `tokio::select!` loop racing the command channel against the
//! open subscriptions and a periodic tick, the same shape the daemon's
//! listener uses to race client I/O against cancellation (see
//! `listener/mod.rs`'s `run_dual`). Split into [`WorkerActor`] (idle, waiting
//! for `Start`) and [`RunningWorker`] (pipeline built) so the pipeline is
//! never behind an `Option` that production code has to unwrap.
//!
//! Every lifecycle acknowledgement (`Started`, `Paused`, `Resumed`,
//! `Stopped`) is sent only after the corresponding lifecycle event has been
//! drained to the store and flushed, so a controller callback never fires
//! ahead of the durable record it reports on.

use std::sync::Arc;
use std::time::Duration;

use cap_core::{CaptureEvent, Clock, MeasurementId};
use cap_storage::SharedStore;
use cap_strategies::{SensorCapture, StrategyRegistry};
use cap_wire::{FromWorker, StopReason, ToWorker};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::low_disk::FreeSpaceProbe;
use crate::pipeline::{DrainStop, Pipeline};
use crate::source::{
    GnssSource, PermissionState, PressureSource, RawFix, RawPressureSample, RawSensorSample,
    SensorSource, SourceFactory,
};

/// How often the actor checks GNSS inactivity and drains the write queue,
/// independent of when samples actually arrive.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

pub struct WorkerActor<C: Clock> {
    sources: Arc<dyn SourceFactory>,
    store: SharedStore,
    registry: Arc<StrategyRegistry>,
    clock: C,
    to_worker: mpsc::Receiver<ToWorker>,
    from_worker: mpsc::Sender<FromWorker>,
    low_disk_threshold_bytes: u64,
    inactivity_window_ms: u64,
    tick_interval_ms: u64,
}

#[allow(clippy::too_many_arguments)]
impl<C: Clock> WorkerActor<C> {
    pub fn new(
        sources: Arc<dyn SourceFactory>,
        store: SharedStore,
        registry: Arc<StrategyRegistry>,
        clock: C,
        to_worker: mpsc::Receiver<ToWorker>,
        from_worker: mpsc::Sender<FromWorker>,
        low_disk_threshold_bytes: u64,
        inactivity_window_ms: u64,
    ) -> Self {
        Self {
            sources,
            store,
            registry,
            clock,
            to_worker,
            from_worker,
            low_disk_threshold_bytes,
            inactivity_window_ms,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }

    /// Run until the controller sends `Stop`, the command channel closes, or
    /// the worker stops itself (low disk, permission revoked, dead store).
    pub async fn run(self) {
        if let Some(mut running) = self.wait_for_start().await {
            // The start event must be durable before readiness is signalled.
            if running.drain_or_stop().await.is_err() {
                return;
            }
            let _ = running.actor.from_worker.send(FromWorker::Started).await;
            info!(measurement_id = running.measurement_id.get(), "worker started");
            running.run_loop().await;
        }
    }

    /// Block until `Start` arrives, answering stray `Probe`s in the meantime.
    async fn wait_for_start(mut self) -> Option<RunningWorker<C>> {
        loop {
            match self.to_worker.recv().await? {
                ToWorker::Start {
                    measurement_id,
                    distance_strategy,
                    cleaning_strategy,
                    sensor_capture,
                    space_strategy,
                } => {
                    let mut pipeline = Pipeline::new(
                        measurement_id,
                        Arc::clone(&self.registry),
                        distance_strategy,
                        cleaning_strategy,
                        sensor_capture,
                        space_strategy,
                        self.inactivity_window_ms,
                        self.low_disk_threshold_bytes,
                    );
                    let ts = self.clock.epoch_ms();
                    pipeline.queue_event(CaptureEvent::LifecycleStart { measurement_id, timestamp_ms: ts });
                    let free_space = self.sources.open_free_space_probe();
                    let mut running = RunningWorker {
                        actor: self,
                        pipeline,
                        measurement_id,
                        sensor_capture,
                        free_space,
                        paused: false,
                        gnss: None,
                        sensors: None,
                        pressure: None,
                        gnss_done: false,
                        sensors_done: false,
                        pressure_done: false,
                    };
                    running.open_subscriptions();
                    return Some(running);
                }
                ToWorker::Probe(id) => {
                    let _ = self.from_worker.send(FromWorker::Pong(id)).await;
                }
                ToWorker::Pause | ToWorker::Resume | ToWorker::Stop => {
                    // Nothing is running yet; these only make sense post-Start.
                }
            }
        }
    }
}

/// A worker actor with its pipeline built, actively capturing (or paused,
/// with its subscriptions released).
struct RunningWorker<C: Clock> {
    actor: WorkerActor<C>,
    pipeline: Pipeline,
    measurement_id: MeasurementId,
    sensor_capture: SensorCapture,
    free_space: Box<dyn FreeSpaceProbe>,
    paused: bool,
    gnss: Option<Box<dyn GnssSource>>,
    sensors: Option<Box<dyn SensorSource>>,
    pressure: Option<Box<dyn PressureSource>>,
    gnss_done: bool,
    sensors_done: bool,
    pressure_done: bool,
}

impl<C: Clock> RunningWorker<C> {
    /// Open fresh subscription handles for a new capture segment.
    fn open_subscriptions(&mut self) {
        self.gnss = Some(self.actor.sources.open_gnss());
        self.sensors = self
            .sensor_capture
            .captures_inertial()
            .then(|| self.actor.sources.open_sensors(&self.sensor_capture));
        self.pressure = Some(self.actor.sources.open_pressure());
        self.gnss_done = false;
        self.sensors_done = false;
        self.pressure_done = false;
    }

    /// Drop all subscription handles, unregistering the platform listeners.
    fn release_subscriptions(&mut self) {
        self.gnss = None;
        self.sensors = None;
        self.pressure = None;
    }

    async fn run_loop(mut self) {
        let mut tick = tokio::time::interval(Duration::from_millis(self.actor.tick_interval_ms));

        loop {
            tokio::select! {
                command = self.actor.to_worker.recv() => {
                    match command {
                        Some(ToWorker::Pause) => {
                            if !self.paused && self.handle_pause().await.is_err() {
                                return;
                            }
                        }
                        Some(ToWorker::Resume) => {
                            if self.paused && self.handle_resume().await.is_err() {
                                return;
                            }
                        }
                        Some(ToWorker::Stop) => {
                            let stopped_successfully = !self.paused;
                            self.stop(Some(stopped_successfully)).await;
                            return;
                        }
                        Some(ToWorker::Probe(id)) => {
                            let _ = self.actor.from_worker.send(FromWorker::Pong(id)).await;
                        }
                        Some(ToWorker::Start { .. }) => {
                            warn!("ignoring a second start while already capturing");
                        }
                        None => {
                            // The controller dropped its end; close out cleanly.
                            self.stop(None).await;
                            return;
                        }
                    }
                }
                fix = next_fix(&mut self.gnss), if self.gnss.is_some() && !self.gnss_done => {
                    match fix {
                        Some(fix) => {
                            if self.permission_revoked().await {
                                let _ = self.actor.from_worker.send(FromWorker::MissingPermission).await;
                                self.stop_itself(StopReason::PermissionRevoked).await;
                                return;
                            }
                            let events = {
                                let mut store = self.actor.store.lock();
                                self.pipeline.on_fix(&mut store, fix)
                            };
                            for event in events {
                                let _ = self.actor.from_worker.send(event).await;
                            }
                        }
                        None => self.gnss_done = true,
                    }
                }
                sample = next_sensor(&mut self.sensors), if self.sensors.is_some() && !self.sensors_done => {
                    match sample {
                        Some(sample) => {
                            if let Some(event) = self.pipeline.on_sensor_sample(sample) {
                                let _ = self.actor.from_worker.send(event).await;
                            }
                        }
                        None => self.sensors_done = true,
                    }
                }
                sample = next_pressure(&mut self.pressure), if self.pressure.is_some() && !self.pressure_done => {
                    match sample {
                        Some(sample) => self.pipeline.on_pressure_sample(sample),
                        None => self.pressure_done = true,
                    }
                }
                _ = tick.tick() => {
                    if !self.paused {
                        let now_ms = self.actor.clock.epoch_ms();
                        if let Some(event) = self.pipeline.check_inactivity(now_ms) {
                            let _ = self.actor.from_worker.send(event).await;
                        }
                    }
                    if self.drain_or_stop().await.is_err() {
                        return;
                    }
                }
            }
        }
    }

    async fn permission_revoked(&self) -> bool {
        match &self.gnss {
            Some(gnss) => gnss.permission().await == PermissionState::Denied,
            None => false,
        }
    }

    async fn handle_pause(&mut self) -> Result<(), ()> {
        self.paused = true;
        self.release_subscriptions();
        self.pipeline.flush_partial_windows();
        let ts = self.actor.clock.epoch_ms();
        self.pipeline.queue_event(CaptureEvent::LifecyclePause {
            measurement_id: self.measurement_id,
            timestamp_ms: ts,
        });
        self.drain_or_stop().await?;
        let _ = self.actor.from_worker.send(FromWorker::Paused).await;
        Ok(())
    }

    async fn handle_resume(&mut self) -> Result<(), ()> {
        let ts = self.actor.clock.epoch_ms();
        self.pipeline.queue_event(CaptureEvent::LifecycleResume {
            measurement_id: self.measurement_id,
            timestamp_ms: ts,
        });
        // The resume event is flushed before the new segment's subscriptions
        // open, so no location of the resumed segment can precede it.
        self.drain_or_stop().await?;
        self.open_subscriptions();
        self.paused = false;
        let _ = self.actor.from_worker.send(FromWorker::Resumed).await;
        Ok(())
    }

    /// Drain the write queue and flush; on failure the worker has already
    /// stopped itself and the caller must exit its loop.
    async fn drain_or_stop(&mut self) -> Result<(), ()> {
        let result = {
            let mut store = self.actor.store.lock();
            let result = self.pipeline.drain_queue(&mut store, &*self.free_space);
            if result.is_ok() {
                let _ = store.flush();
            }
            result
        };
        match result {
            Ok(()) => Ok(()),
            Err(DrainStop::LowDisk) => {
                self.stop_itself(StopReason::LowDiskSpace).await;
                Err(())
            }
            Err(DrainStop::Persistence(error)) => {
                let _ = self.actor.from_worker.send(FromWorker::ErrorState { error }).await;
                self.stop_itself(StopReason::PersistenceFailed).await;
                Err(())
            }
        }
    }

    /// Flush everything, mark the measurement finished, and (when `reply` is
    /// set) acknowledge the controller's stop command.
    async fn stop(&mut self, reply: Option<bool>) {
        let ts = self.actor.clock.epoch_ms();
        self.pipeline.queue_event(CaptureEvent::LifecycleStop {
            measurement_id: self.measurement_id,
            timestamp_ms: ts,
        });
        self.pipeline.flush_partial_windows();
        self.release_subscriptions();
        {
            let mut store = self.actor.store.lock();
            if let Err(e) = self.pipeline.drain_for_shutdown(&mut store) {
                warn!(error = ?e, "final drain failed on stop");
            }
            if let Err(e) = self.pipeline.close_out(&mut store) {
                warn!(error = %e, "failed to mark measurement finished on stop");
            }
            let _ = store.flush();
        }
        if let Some(stopped_successfully) = reply {
            let _ = self.actor.from_worker.send(FromWorker::Stopped { stopped_successfully }).await;
        }
    }

    async fn stop_itself(&mut self, reason: StopReason) {
        warn!(?reason, "worker stopping itself");
        self.stop(None).await;
        let _ = self.actor.from_worker.send(FromWorker::StoppedItself { reason }).await;
    }
}

// Helpers for the select arms: a released subscription never yields, and the
// arm guards keep a `None` source from being polled at all.

async fn next_fix(source: &mut Option<Box<dyn GnssSource>>) -> Option<RawFix> {
    match source.as_mut() {
        Some(s) => s.next_fix().await,
        None => std::future::pending().await,
    }
}

async fn next_sensor(source: &mut Option<Box<dyn SensorSource>>) -> Option<RawSensorSample> {
    match source.as_mut() {
        Some(s) => s.next_sample().await,
        None => std::future::pending().await,
    }
}

async fn next_pressure(source: &mut Option<Box<dyn PressureSource>>) -> Option<RawPressureSample> {
    match source.as_mut() {
        Some(s) => s.next_sample().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
