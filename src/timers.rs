/// The pulsing cue starts once the result countdown is at or below this
pub const PULSE_THRESHOLD_SECS: u32 = 5;

/// Formats seconds as zero-padded `MM:SS`
pub fn format_mmss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Outcome of one result countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Running,
    Expired,
}

/// Self-expiring countdown shown next to the revealed winner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCountdown {
    remaining: u32,
    active: bool,
}

impl ResultCountdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            remaining: duration_secs,
            active: false,
        }
    }

    /// Re-arms from `duration_secs`; starting twice never stacks
    pub fn start(&mut self, duration_secs: u32) {
        self.remaining = duration_secs;
        self.active = true;
    }

    /// Stops and resets the display value
    pub fn disarm(&mut self, duration_secs: u32) {
        self.remaining = duration_secs;
        self.active = false;
    }

    pub fn tick(&mut self) -> CountdownTick {
        if !self.active {
            return CountdownTick::Running;
        }
        if self.remaining > 0 {
            self.remaining -= 1;
        }
        if self.remaining == 0 {
            self.active = false;
            CountdownTick::Expired
        } else {
            CountdownTick::Running
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_pulsing(&self) -> bool {
        self.active && self.remaining > 0 && self.remaining <= PULSE_THRESHOLD_SECS
    }

    pub fn display(&self) -> String {
        format_mmss(self.remaining)
    }
}

/// Remote start/stop match clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchClock {
    remaining: u32,
    running: bool,
}

impl MatchClock {
    pub fn new(remaining_secs: u32) -> Self {
        Self {
            remaining: remaining_secs,
            running: false,
        }
    }

    /// A new time always pauses the clock
    pub fn set(&mut self, remaining_secs: u32) {
        self.remaining = remaining_secs;
        self.running = false;
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn tick(&mut self) {
        if self.running && self.remaining > 0 {
            self.remaining -= 1;
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn display(&self) -> String {
        format_mmss(self.remaining)
    }
}
