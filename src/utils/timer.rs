//! Wall-clock timer with an accumulator.

use std::time::{Duration, Instant};

/// Measures elapsed time and accumulates selected intervals.
///
/// `tic` marks a start point, `toc` reads the time since it, `hold` adds that
/// reading to the accumulator and `release` returns and clears the accumulator.
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
    acc: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a timer with an empty accumulator, started now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            acc: Duration::ZERO,
        }
    }

    /// Resets the start mark to now.
    pub fn tic(&mut self) {
        self.start = Instant::now();
    }

    /// Returns the time since the start mark, optionally moving the mark to now.
    pub fn toc(&mut self, restart: bool) -> Duration {
        let elapsed = self.start.elapsed();
        if restart {
            self.start = Instant::now();
        }
        elapsed
    }

    /// Adds the time since the start mark to the accumulator.
    pub fn hold(&mut self) {
        let elapsed = self.toc(false);
        self.acc += elapsed;
    }

    /// Returns the accumulated time and clears the accumulator.
    pub fn release(&mut self) -> Duration {
        std::mem::take(&mut self.acc)
    }

    /// Clears the accumulator without touching the start mark.
    pub fn reset(&mut self) {
        self.acc = Duration::ZERO;
    }
}
