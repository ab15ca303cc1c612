#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use simpulse::kernel::telemetry::event::{DeliveryCallback, DeliveryOutcome};
use simpulse::services::transport::Transport;
use tokio::sync::mpsc;

/// Transport double. Records every send; completes immediately when `auto` is set,
/// otherwise parks the callback until the test completes it.
#[derive(Default)]
pub struct MockTransport {
    pub sent: Mutex<Vec<(String, String)>>,
    pending: Mutex<VecDeque<Arc<dyn DeliveryCallback>>>,
    auto: Mutex<Option<DeliveryOutcome>>,
}

impl MockTransport {
    pub fn deferred() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn completing_with(outcome: DeliveryOutcome) -> Arc<Self> {
        let transport = Self::default();
        *transport.auto.lock().unwrap() = Some(outcome);
        Arc::new(transport)
    }

    pub fn set_auto(&self, outcome: Option<DeliveryOutcome>) {
        *self.auto.lock().unwrap() = outcome;
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, body)| body.clone()).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Drop every parked callback without completing it. Returns how many were parked.
    pub fn abandon_all(&self) -> usize {
        let parked: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        parked.len()
    }

    /// Complete the oldest parked delivery. Returns false when nothing is parked.
    pub fn complete_next(&self, outcome: DeliveryOutcome) -> bool {
        let next = self.pending.lock().unwrap().pop_front();
        match next {
            Some(callback) => {
                outcome.dispatch(callback.as_ref());
                true
            }
            None => false,
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, endpoint: &str, body: String, callback: Arc<dyn DeliveryCallback>) {
        self.sent.lock().unwrap().push((endpoint.to_string(), body));
        let auto = self.auto.lock().unwrap().clone();
        match auto {
            Some(outcome) => outcome.dispatch(callback.as_ref()),
            None => self.pending.lock().unwrap().push_back(callback),
        }
    }
}

/// Forwards every outcome into a channel.
pub struct ChannelObserver(pub mpsc::UnboundedSender<DeliveryOutcome>);

impl ChannelObserver {
    pub fn pair() -> (Arc<Self>, mpsc::UnboundedReceiver<DeliveryOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self(tx)), rx)
    }
}

impl DeliveryCallback for ChannelObserver {
    fn on_success(&self, body: &str, size: usize) {
        let _ = self.0.send(DeliveryOutcome::Success {
            body: body.to_string(),
            size,
        });
    }

    fn on_error(&self, code: i32) {
        let _ = self.0.send(DeliveryOutcome::Error { code });
    }

    fn on_timeout(&self) {
        let _ = self.0.send(DeliveryOutcome::Timeout);
    }
}
