use std::collections::VecDeque;

use super::event::{OutcomeKind, TelemetryEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub delivery_stats: DeliveryStats,
    pub tick_stats: TickStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryStats {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub dropped: u64,
    pub total_bytes: u64,
    pub avg_payload_bytes: f64,
    pub last_error_code: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    pub skipped: u64,
    pub aborted: u64,
    pub max_players: usize,
}

impl DeliveryStats {
    /// Dispatched deliveries without a reported outcome inside the recorded range.
    pub fn pending(&self) -> u64 {
        self.dispatched
            .saturating_sub(self.succeeded + self.failed + self.timed_out + self.dropped)
    }
}

pub fn compute_stats(events: &VecDeque<TelemetryEvent>) -> PipelineStats {
    let mut stats = PipelineStats::default();

    for event in events {
        match event {
            TelemetryEvent::DeliveryDispatched { bytes, players, .. } => {
                stats.delivery_stats.dispatched += 1;
                stats.delivery_stats.total_bytes += *bytes as u64;
                if *players > stats.tick_stats.max_players {
                    stats.tick_stats.max_players = *players;
                }
            }
            TelemetryEvent::DeliveryCompleted { outcome, code, .. } => match outcome {
                OutcomeKind::Success => stats.delivery_stats.succeeded += 1,
                OutcomeKind::Error => {
                    stats.delivery_stats.failed += 1;
                    stats.delivery_stats.last_error_code = *code;
                }
                OutcomeKind::Timeout => stats.delivery_stats.timed_out += 1,
                OutcomeKind::Dropped => stats.delivery_stats.dropped += 1,
            },
            TelemetryEvent::TickSkipped { .. } => stats.tick_stats.skipped += 1,
            TelemetryEvent::TickAborted { .. } => stats.tick_stats.aborted += 1,
        }
    }

    if stats.delivery_stats.dispatched > 0 {
        stats.delivery_stats.avg_payload_bytes =
            stats.delivery_stats.total_bytes as f64 / stats.delivery_stats.dispatched as f64;
    }

    stats
}
