/// Value reported before the first full window has been measured.
pub const DEFAULT_FPS: f64 = 60.0;

/// Length of one measurement window, in seconds.
pub const WINDOW_SECONDS: f64 = 1.0;

/// Smoothed frame rate over consecutive one-second windows.
///
/// Fed once per host frame with that frame's elapsed time. The reported value only moves
/// when a window closes; in between it holds the previous window's rate.
#[derive(Debug, Clone)]
pub struct MetricWindow {
    accumulated_time: f64,
    sample_count: u32,
    current_value: f64,
}

impl MetricWindow {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_FPS)
    }

    pub fn with_seed(seed: f64) -> Self {
        Self {
            accumulated_time: 0.0,
            sample_count: 0,
            current_value: seed,
        }
    }

    /// Accumulate one frame. Returns `true` when this call closed a window.
    pub fn advance(&mut self, delta_time: f64) -> bool {
        // A monotonic host clock never produces these
        if !delta_time.is_finite() || delta_time < 0.0 {
            return false;
        }

        self.accumulated_time += delta_time;
        self.sample_count += 1;

        if self.accumulated_time >= WINDOW_SECONDS {
            self.current_value = self.sample_count as f64 / self.accumulated_time;
            self.sample_count = 0;
            self.accumulated_time = 0.0;
            return true;
        }
        false
    }

    pub fn value(&self) -> f64 {
        self.current_value
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn accumulated_time(&self) -> f64 {
        self.accumulated_time
    }
}

impl Default for MetricWindow {
    fn default() -> Self {
        Self::new()
    }
}
