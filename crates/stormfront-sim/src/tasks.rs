//! Fixed-period recurring tasks on the tick clock.

use stormfront_core::constants::DT;

/// A recurring task due every `period_ticks`. Cancelling is idempotent and
/// permanent; a cancelled task never fires again.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicTask {
    period_ticks: u64,
    next_due: u64,
    cancelled: bool,
}

impl PeriodicTask {
    /// First due one period after `start_tick`.
    pub fn new(period_ticks: u64, start_tick: u64) -> Self {
        let period_ticks = period_ticks.max(1);
        Self {
            period_ticks,
            next_due: start_tick + period_ticks,
            cancelled: false,
        }
    }

    /// A task that never fires (not yet started).
    pub fn idle() -> Self {
        Self {
            period_ticks: 1,
            next_due: 0,
            cancelled: true,
        }
    }

    /// True when the task is due at `tick`; schedules the next run.
    pub fn poll(&mut self, tick: u64) -> bool {
        if self.cancelled || tick < self.next_due {
            return false;
        }
        self.next_due = tick + self.period_ticks;
        true
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn period_ticks(&self) -> u64 {
        self.period_ticks
    }

    /// Period in seconds at the engine tick rate.
    pub fn period_secs(&self) -> f64 {
        self.period_ticks as f64 * DT
    }
}
