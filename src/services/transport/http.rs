use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::runtime::Handle;
use tracing::debug;

use super::Transport;
use crate::error::{TelemetryError, TelemetryResult};
use crate::kernel::telemetry::event::{DeliveryCallback, DeliveryOutcome};

// Transport-level failure codes. Positive codes are HTTP statuses.
pub const CODE_CONNECT: i32 = -1;
pub const CODE_REQUEST: i32 = -2;
pub const CODE_BODY: i32 = -3;
pub const CODE_OTHER: i32 = -4;

/// HTTP POST delivery on the tokio runtime that was current at construction.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    runtime: Handle,
}

impl HttpTransport {
    /// Fails when no tokio runtime is running or the HTTP client cannot be built; callers
    /// treat that as the capability being absent.
    pub fn new(timeout: Duration) -> TelemetryResult<Self> {
        let client = Client::builder()
            .timeout(timeout) // Deadline for the whole exchange, surfaces as Timeout
            .build()
            .map_err(|e| TelemetryError::CapabilityUnavailable(format!("http client: {}", e)))?;
        Self::with_client(client)
    }

    /// Use a preconfigured client. Its timeout, if any, decides when `Timeout` is reported.
    pub fn with_client(client: Client) -> TelemetryResult<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| TelemetryError::CapabilityUnavailable(format!("no async runtime: {}", e)))?;
        Ok(Self { client, runtime })
    }
}

impl Transport for HttpTransport {
    fn send(&self, endpoint: &str, body: String, callback: Arc<dyn DeliveryCallback>) {
        let client = self.client.clone();
        let endpoint = endpoint.to_string();

        self.runtime.spawn(async move {
            let outcome = post(&client, &endpoint, body).await;
            debug!(%endpoint, outcome = ?outcome.kind(), "delivery finished");
            outcome.dispatch(callback.as_ref());
        });
    }
}

async fn post(client: &Client, endpoint: &str, body: String) -> DeliveryOutcome {
    let response = match client
        .post(endpoint)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return failure(&e),
    };

    let status = response.status();
    if !status.is_success() {
        return DeliveryOutcome::Error {
            code: i32::from(status.as_u16()),
        };
    }

    match response.text().await {
        Ok(text) => DeliveryOutcome::Success {
            size: text.len(),
            body: text,
        },
        Err(e) => failure(&e),
    }
}

fn failure(e: &reqwest::Error) -> DeliveryOutcome {
    if e.is_timeout() {
        return DeliveryOutcome::Timeout;
    }
    let code = if let Some(status) = e.status() {
        i32::from(status.as_u16())
    } else if e.is_connect() {
        CODE_CONNECT
    } else if e.is_builder() || e.is_request() {
        CODE_REQUEST
    } else if e.is_body() || e.is_decode() {
        CODE_BODY
    } else {
        CODE_OTHER
    };
    DeliveryOutcome::Error { code }
}
