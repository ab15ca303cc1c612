pub mod encoder;
pub mod reactor;
pub mod scheduler;
pub mod snapshot;
pub mod telemetry;
pub mod time;
