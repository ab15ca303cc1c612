use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::host::Host;

use super::scheduler::{TelemetryScheduler, TickOutcome};

/// Cooperative driver: host frames and the telemetry trigger share one task.
pub struct Reactor<H: Host> {
    pub host: H,
    pub scheduler: TelemetryScheduler,
}

impl<H: Host> Reactor<H> {
    pub fn new(host: H, scheduler: TelemetryScheduler) -> Self {
        Self { host, scheduler }
    }

    /// Advance the host by one frame and feed its duration to the metric window.
    pub fn frame_step(&mut self, delta_time: f64) {
        self.host.step(delta_time);
        self.scheduler.on_frame(delta_time);
    }

    /// Fire the telemetry trigger once. Returns immediately; delivery completes later.
    pub fn telemetry_step(&mut self) -> TickOutcome {
        self.scheduler.tick_step(&self.host, &self.host)
    }

    /// Async driver loop. Runs until `shutdown` is cancelled.
    ///
    /// The telemetry cadence only exists when the scheduler is armed. Its first firing is one
    /// full interval after start; late firings are skipped rather than bunched up.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        let frame_period = self.scheduler.settings().frame_interval;
        let telemetry_period = self.scheduler.settings().interval;
        let armed = self.scheduler.is_armed();

        let mut frames = interval(frame_period);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut telemetry = interval_at(Instant::now() + telemetry_period, telemetry_period);
        telemetry.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if armed {
            info!(
                frame_ms = frame_period.as_millis() as u64,
                telemetry_ms = telemetry_period.as_millis() as u64,
                "reactor started"
            );
        } else {
            warn!("telemetry disabled, driving host frames only");
        }

        let mut last_frame = Instant::now();
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!(ticks = self.scheduler.current_tick().frame, "reactor stopping");
                    break;
                }

                _ = frames.tick() => {
                    let now = Instant::now();
                    let delta = now.duration_since(last_frame).as_secs_f64();
                    last_frame = now;
                    self.frame_step(delta);
                }

                _ = telemetry.tick(), if armed => {
                    if let TickOutcome::Aborted { tick, phase } = self.telemetry_step() {
                        warn!(tick = tick.frame, ?phase, "telemetry tick aborted");
                    }
                }
            }
        }
    }
}
