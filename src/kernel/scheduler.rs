use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{SchedulerSettings, TelemetryConfig};
use crate::error::{TelemetryError, TelemetryResult};
use crate::host::{Clock, EntityRegistry};
use crate::services::transport::Transport;

use super::encoder::DocumentEncoder;
use super::snapshot::SnapshotBuilder;
use super::telemetry::event::{DeliveryCallback, OutcomeKind, TelemetryEvent, TickPhase};
use super::telemetry::metrics::PipelineStats;
use super::telemetry::recorder::TelemetryRecorder;
use super::telemetry::window::MetricWindow;
use super::time::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Uninitialized,
    Armed,
}

/// What one trigger firing did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Sent { tick: Tick, delivery_id: Uuid, bytes: usize },
    Skipped { tick: Tick, in_flight: usize },
    Aborted { tick: Tick, phase: TickPhase },
    NotArmed,
}

/// Owns the telemetry pipeline: window, config, transport handle, snapshot buffer.
///
/// One value per process, driven by the host's cooperative loop. Failures inside a tick end
/// that tick and are logged; nothing escapes to the caller.
pub struct TelemetryScheduler {
    config: TelemetryConfig,
    settings: SchedulerSettings,
    transport: Option<Arc<dyn Transport>>,
    state: SchedulerState,
    window: MetricWindow,
    builder: SnapshotBuilder,
    encoder: DocumentEncoder,
    tick: Tick,
    in_flight: Arc<AtomicUsize>,
    recorder: Arc<Mutex<TelemetryRecorder>>,
    observer: Option<Arc<dyn DeliveryCallback>>,
}

impl TelemetryScheduler {
    pub fn new(
        config: TelemetryConfig,
        transport: Option<Arc<dyn Transport>>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            config,
            settings,
            transport,
            state: SchedulerState::Uninitialized,
            window: MetricWindow::new(),
            builder: SnapshotBuilder::new(),
            encoder: DocumentEncoder::new(),
            tick: Tick::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            recorder: Arc::new(Mutex::new(TelemetryRecorder::new())),
            observer: None,
        }
    }

    /// Extra callback invoked after the scheduler's own bookkeeping for every outcome.
    pub fn with_observer(mut self, observer: Arc<dyn DeliveryCallback>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Uninitialized -> Armed. Requires a transport and an endpoint that parses as a URL.
    ///
    /// On failure the scheduler stays Uninitialized for good and every tick is a no-op.
    pub fn arm(&mut self) -> TelemetryResult<()> {
        if self.state == SchedulerState::Armed {
            return Ok(());
        }
        if self.transport.is_none() {
            return Err(TelemetryError::CapabilityUnavailable(
                "no transport provided by host".to_string(),
            ));
        }
        if let Err(e) = reqwest::Url::parse(&self.config.endpoint) {
            return Err(TelemetryError::InvalidEndpoint {
                endpoint: self.config.endpoint.clone(),
                reason: e.to_string(),
            });
        }

        self.state = SchedulerState::Armed;
        info!(
            endpoint = %self.config.endpoint,
            interval_ms = self.settings.interval.as_millis() as u64,
            "telemetry armed"
        );
        Ok(())
    }

    /// Feed one host frame into the metric window.
    pub fn on_frame(&mut self, delta_time: f64) {
        self.window.advance(delta_time);
    }

    /// One trigger firing: Building -> Encoding -> Sending.
    ///
    /// Never waits on earlier deliveries. Skips when `max_in_flight` are still outstanding.
    pub fn tick_step(&mut self, registry: &dyn EntityRegistry, clock: &dyn Clock) -> TickOutcome {
        let Some(transport) = self.transport.clone().filter(|_| self.state == SchedulerState::Armed)
        else {
            return TickOutcome::NotArmed;
        };

        self.tick = self.tick.next();
        let tick = self.tick;

        let in_flight = self.in_flight.load(Ordering::Acquire);
        if in_flight >= self.settings.max_in_flight {
            debug!(tick = tick.frame, in_flight, "previous delivery outstanding, tick skipped");
            self.record(TelemetryEvent::TickSkipped { tick, in_flight });
            return TickOutcome::Skipped { tick, in_flight };
        }

        // Building
        let snapshot = self.builder.build(&self.window, registry, clock);
        let players = snapshot.entity_count;

        // Encoding
        let body = match self.encoder.encode(snapshot) {
            Ok(body) => body,
            Err(e) => {
                error!(tick = tick.frame, error = %e, "snapshot encoding failed");
                let phase = TickPhase::Encoding;
                self.record(TelemetryEvent::TickAborted { tick, phase });
                return TickOutcome::Aborted { tick, phase };
            }
        };

        // Sending
        let delivery_id = Uuid::new_v4();
        let bytes = body.len();
        self.record(TelemetryEvent::DeliveryDispatched {
            tick,
            delivery_id,
            bytes,
            players,
        });
        self.in_flight.fetch_add(1, Ordering::AcqRel);

        let callback = Arc::new(TickCallback {
            delivery_id,
            tick,
            finished: AtomicBool::new(false),
            in_flight: Arc::clone(&self.in_flight),
            recorder: Arc::clone(&self.recorder),
            observer: self.observer.clone(),
        });
        debug!(tick = tick.frame, %delivery_id, bytes, players, "dispatching snapshot");
        transport.send(&self.config.endpoint, body, callback);

        TickOutcome::Sent {
            tick,
            delivery_id,
            bytes,
        }
    }

    fn record(&self, event: TelemetryEvent) {
        lock(&self.recorder).record(event);
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == SchedulerState::Armed
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub fn window(&self) -> &MetricWindow {
        &self.window
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> PipelineStats {
        lock(&self.recorder).stats()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        lock(&self.recorder).events().cloned().collect()
    }
}

// A panic while recording cannot leave the buffer half-written, so poisoning is ignored.
fn lock(recorder: &Mutex<TelemetryRecorder>) -> MutexGuard<'_, TelemetryRecorder> {
    recorder.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Per-delivery bookkeeping: frees the in-flight slot, records and logs the outcome.
///
/// The slot is released exactly once. Later outcomes for the same delivery are ignored, and a
/// callback dropped without any outcome releases the slot as `Dropped`.
struct TickCallback {
    delivery_id: Uuid,
    tick: Tick,
    finished: AtomicBool,
    in_flight: Arc<AtomicUsize>,
    recorder: Arc<Mutex<TelemetryRecorder>>,
    observer: Option<Arc<dyn DeliveryCallback>>,
}

impl TickCallback {
    /// Returns false when an outcome was already reported for this delivery.
    fn finish(&self, outcome: OutcomeKind, code: Option<i32>) -> bool {
        if self.finished.swap(true, Ordering::AcqRel) {
            warn!(
                tick = self.tick.frame,
                delivery_id = %self.delivery_id,
                ?outcome,
                "duplicate delivery outcome ignored"
            );
            return false;
        }
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        lock(&self.recorder).record(TelemetryEvent::DeliveryCompleted {
            delivery_id: self.delivery_id,
            outcome,
            code,
        });
        true
    }
}

impl DeliveryCallback for TickCallback {
    fn on_success(&self, body: &str, size: usize) {
        if !self.finish(OutcomeKind::Success, None) {
            return;
        }
        debug!(tick = self.tick.frame, delivery_id = %self.delivery_id, size, "telemetry delivered");
        if let Some(observer) = &self.observer {
            observer.on_success(body, size);
        }
    }

    fn on_error(&self, code: i32) {
        if !self.finish(OutcomeKind::Error, Some(code)) {
            return;
        }
        warn!(tick = self.tick.frame, delivery_id = %self.delivery_id, code, "telemetry POST error");
        if let Some(observer) = &self.observer {
            observer.on_error(code);
        }
    }

    fn on_timeout(&self) {
        if !self.finish(OutcomeKind::Timeout, None) {
            return;
        }
        warn!(tick = self.tick.frame, delivery_id = %self.delivery_id, "telemetry POST timeout");
        if let Some(observer) = &self.observer {
            observer.on_timeout();
        }
    }
}

impl Drop for TickCallback {
    fn drop(&mut self) {
        if *self.finished.get_mut() {
            return;
        }
        warn!(tick = self.tick.frame, delivery_id = %self.delivery_id, "delivery dropped without an outcome");
        self.finish(OutcomeKind::Dropped, None);
    }
}
