pub mod config;
pub mod error;
pub mod host;
pub mod kernel;
pub mod services;

// Re-export the pieces a host needs to embed the pipeline
pub use config::{SchedulerSettings, TelemetryConfig};
pub use error::TelemetryError;
pub use kernel::reactor::Reactor;
pub use kernel::scheduler::TelemetryScheduler;
