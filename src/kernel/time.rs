/// Ordinal of a telemetry trigger firing. Starts at 0, first fired tick is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick {
    pub frame: u64,
}

/// Host frame cadence of the reactor.
pub const FRAME_MS: u64 = 20;

/// Telemetry trigger period.
pub const TELEMETRY_INTERVAL_MS: u64 = 5000;

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }
}
