use uuid::Uuid;

use crate::kernel::time::Tick;

/// Result of one delivery attempt. Handed to a callback, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success { body: String, size: usize },
    Error { code: i32 },
    Timeout,
}

impl DeliveryOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            DeliveryOutcome::Success { .. } => OutcomeKind::Success,
            DeliveryOutcome::Error { .. } => OutcomeKind::Error,
            DeliveryOutcome::Timeout => OutcomeKind::Timeout,
        }
    }

    /// Route this outcome to the matching callback entry point.
    pub fn dispatch(&self, callback: &dyn DeliveryCallback) {
        match self {
            DeliveryOutcome::Success { body, size } => callback.on_success(body, *size),
            DeliveryOutcome::Error { code } => callback.on_error(*code),
            DeliveryOutcome::Timeout => callback.on_timeout(),
        }
    }
}

/// Three-way outcome contract. Exactly one method is called per send.
pub trait DeliveryCallback: Send + Sync {
    fn on_success(&self, body: &str, size: usize);
    fn on_error(&self, code: i32);
    fn on_timeout(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    Error,
    Timeout,
    /// The transport released the callback without reporting anything.
    Dropped,
}

/// Transient stages a tick passes through after the scheduler is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Building,
    Encoding,
    Sending,
}

// Allowed: ids, ticks, counts, sizes, codes
// Forbidden: player names, positions, response bodies

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    DeliveryDispatched {
        tick: Tick,
        delivery_id: Uuid,
        bytes: usize,
        players: usize,
    },

    DeliveryCompleted {
        delivery_id: Uuid,
        outcome: OutcomeKind,
        code: Option<i32>,
    },

    TickSkipped {
        tick: Tick,
        in_flight: usize,
    },

    TickAborted {
        tick: Tick,
        phase: TickPhase,
    },
}
