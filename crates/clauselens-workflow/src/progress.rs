//! Simulated progress for a pending question.
//!
//! This is a UI affordance only. The Q&A call is a single request with no
//! progress reporting; the indicator just creeps toward [`PROGRESS_CAP`] on a
//! timer so the user sees movement, and jumps to 100 when the answer arrives.

use std::time::Duration;

pub const PROGRESS_STEP: u8 = 10;
pub const PROGRESS_CAP: u8 = 90;
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// Monotonic percentage, capped below 100 until [`complete`](Self::complete).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedProgress {
    percent: u8,
}

impl SimulatedProgress {
    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn tick(&mut self) {
        if self.percent < PROGRESS_CAP {
            self.percent = (self.percent + PROGRESS_STEP).min(PROGRESS_CAP);
        }
    }

    pub fn complete(&mut self) {
        self.percent = 100;
    }

    pub fn reset(&mut self) {
        self.percent = 0;
    }
}
