//! Settings document and scheduler settings.
//!
//! The on-disk document has a single recognised field, `Endpoint`. It is read once at startup
//! and never reloaded. A missing document is created with the default endpoint; a broken one
//! is reported and left alone while the default is used.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{TelemetryError, TelemetryResult};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/telemetry";
pub const CONFIG_DIR_NAME: &str = "simpulse";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    #[serde(rename = "Endpoint")]
    pub endpoint: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// `<profile_root>/simpulse/config.json`
pub fn config_path(profile_root: &Path) -> PathBuf {
    profile_root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Load the settings document, creating it with defaults when absent.
///
/// Never fails: every config problem degrades to the default endpoint and a log line.
pub fn load_or_create(profile_root: &Path) -> TelemetryConfig {
    let path = config_path(profile_root);

    if let Some(dir) = path.parent() {
        if !dir.exists() {
            if let Err(source) = fs::create_dir_all(dir) {
                let err = TelemetryError::ConfigIo { path: dir.to_path_buf(), source };
                warn!(error = %err, "could not create config directory, using default endpoint");
                return TelemetryConfig::default();
            }
        }
    }

    if path.exists() {
        match read_config(&path) {
            Ok(config) => {
                info!(endpoint = %config.endpoint, "config loaded");
                config
            }
            Err(err) => {
                warn!(error = %err, "config unreadable, using default endpoint");
                TelemetryConfig::default()
            }
        }
    } else {
        let config = TelemetryConfig::default();
        match write_config(&path, &config) {
            Ok(()) => info!(path = %path.display(), "default config created"),
            Err(err) => warn!(error = %err, "could not write default config"),
        }
        config
    }
}

pub fn read_config(path: &Path) -> TelemetryResult<TelemetryConfig> {
    let content = fs::read_to_string(path).map_err(|source| TelemetryError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| TelemetryError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_config(path: &Path, config: &TelemetryConfig) -> TelemetryResult<()> {
    let json = serde_json::to_string_pretty(config).map_err(|source| TelemetryError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| TelemetryError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Code-level knobs. Not part of the settings document.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Fixed telemetry trigger period.
    pub interval: Duration,
    /// Deadline after which a delivery is reported as a timeout.
    pub request_timeout: Duration,
    /// Outstanding deliveries allowed before ticks are skipped.
    pub max_in_flight: usize,
    /// Host frame cadence used by the reactor.
    pub frame_interval: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(crate::kernel::time::TELEMETRY_INTERVAL_MS),
            request_timeout: Duration::from_secs(10),
            max_in_flight: 1,
            frame_interval: Duration::from_millis(crate::kernel::time::FRAME_MS),
        }
    }
}
