//! Countdown to landfall.
//!
//! Counts down once per second from the configured length. Checkpoints are
//! announced when the remaining seconds equal a configured value, including
//! the starting value. Reaching zero yields landfall and cancels the task.

use stormfront_core::constants::TICKS_PER_SECOND;
use stormfront_core::enums::StormClass;
use stormfront_core::events::StormEvent;
use stormfront_core::state::PersistedCountdown;

use crate::tasks::PeriodicTask;

/// Outcome of one countdown second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Not due this tick, or no checkpoint this second.
    Quiet,
    /// Remaining seconds hit a checkpoint.
    Announce(u32),
    /// Zero reached.
    Landfall,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    class: StormClass,
    remaining_secs: u32,
    checkpoints: Vec<u32>,
    task: PeriodicTask,
}

impl Countdown {
    /// Start counting down `secs` at `tick`. Returns the countdown plus the
    /// start notification (and the first checkpoint, if it matches).
    pub fn begin(
        class: StormClass,
        secs: u32,
        announce_at: &[u32],
        tick: u64,
    ) -> (Self, Vec<StormEvent>) {
        let countdown = Self {
            class,
            remaining_secs: secs,
            checkpoints: announce_at.to_vec(),
            task: PeriodicTask::new(TICKS_PER_SECOND, tick),
        };
        let mut events = vec![StormEvent::CountdownStarted {
            class,
            seconds: secs,
        }];
        if secs > 0 && countdown.checkpoints.contains(&secs) {
            events.push(StormEvent::CountdownAnnouncement {
                class,
                remaining_secs: secs,
            });
        }
        (countdown, events)
    }

    pub fn class(&self) -> StormClass {
        self.class
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_cancelled()
    }

    /// Drive the countdown from the engine tick.
    pub fn poll(&mut self, tick: u64) -> CountdownTick {
        if !self.task.poll(tick) {
            return CountdownTick::Quiet;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.task.cancel();
            return CountdownTick::Landfall;
        }
        if self.checkpoints.contains(&self.remaining_secs) {
            CountdownTick::Announce(self.remaining_secs)
        } else {
            CountdownTick::Quiet
        }
    }

    pub fn cancel(&mut self) {
        self.task.cancel();
    }

    pub fn to_persisted(&self) -> PersistedCountdown {
        PersistedCountdown {
            class: self.class,
            remaining_secs: self.remaining_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(countdown: &mut Countdown, ticks: u64) -> Vec<CountdownTick> {
        (1..=ticks)
            .map(|t| countdown.poll(t))
            .filter(|step| *step != CountdownTick::Quiet)
            .collect()
    }

    #[test]
    fn announces_only_at_checkpoints() {
        let (mut cd, events) = Countdown::begin(StormClass::Severe, 10, &[10, 5], 0);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            StormEvent::CountdownAnnouncement {
                remaining_secs: 10,
                ..
            }
        ));
        let steps = run(&mut cd, 20 * 12);
        assert_eq!(steps, vec![CountdownTick::Announce(5), CountdownTick::Landfall]);
        assert!(!cd.is_running());
    }

    #[test]
    fn landfall_after_exact_length() {
        let (mut cd, _) = Countdown::begin(StormClass::Brief, 3, &[], 0);
        assert!(run(&mut cd, 59).is_empty());
        assert_eq!(cd.remaining_secs(), 1);
        assert_eq!(cd.poll(60), CountdownTick::Landfall);
        assert_eq!(cd.poll(80), CountdownTick::Quiet);
    }

    #[test]
    fn cancelled_countdown_stays_silent() {
        let (mut cd, _) = Countdown::begin(StormClass::Brief, 5, &[4, 3, 2, 1], 0);
        cd.cancel();
        assert!(run(&mut cd, 200).is_empty());
        assert_eq!(cd.to_persisted().remaining_secs, 5);
    }
}
