use serde::{Deserialize, Serialize};

use crate::timers::MatchClock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub left: i64,
    pub right: i64,
}

/// Remote-controlled presentation config. Lives only for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub result_duration_secs: u32,
    pub match_clock: MatchClock,
    pub scores: Scores,
}

impl Config {
    pub fn new(result_duration_secs: u32, global_time_secs: u32) -> Self {
        Self {
            result_duration_secs,
            match_clock: MatchClock::new(global_time_secs),
            scores: Scores::default(),
        }
    }

    pub fn global_time_remaining_secs(&self) -> u32 {
        self.match_clock.remaining()
    }

    pub fn global_timer_running(&self) -> bool {
        self.match_clock.is_running()
    }

    /// Applies a `SetTimers` payload; the match clock is left paused
    pub fn set_timers(&mut self, result_duration_secs: u32, global_time_secs: u32) {
        self.result_duration_secs = result_duration_secs;
        self.match_clock.set(global_time_secs);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(60, 0)
    }
}
