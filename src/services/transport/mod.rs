//! Delivery of encoded documents to the collector.

pub mod http;

use std::sync::Arc;

use crate::kernel::telemetry::event::DeliveryCallback;

pub use http::HttpTransport;

/// Non-blocking delivery capability.
///
/// `send` must return without waiting on the network and report the outcome exactly once,
/// later, through `callback`. No retries: a failed delivery is reported and forgotten.
pub trait Transport: Send + Sync {
    fn send(&self, endpoint: &str, body: String, callback: Arc<dyn DeliveryCallback>);
}
