//! Pipeline error types.
//!
//! Delivery failures are not errors here: they travel as `DeliveryOutcome`s through the
//! callback contract. Everything below is either startup-fatal for the feature or terminal
//! for a single tick.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("config io error at {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("transport capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("document encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
