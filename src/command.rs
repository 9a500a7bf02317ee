use log::warn;
use serde::Deserialize;

use crate::config::Scores;
use crate::error::PollError;

/// Discrete remote action, identified by a monotonic id
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CommandKind {
    Spin,
    Reset,
    SetTimers {
        result_duration_secs: u32,
        global_time_secs: u32,
    },
    ControlGlobalTimer {
        running: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub id: u64,
    pub kind: CommandKind,
}

/// One poll response. Scores are live state and present independently of
/// whether a new command is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSnapshot {
    /// 0 means no command has ever been issued
    pub command_id: u64,
    pub command: Option<CommandKind>,
    pub scores: Option<Scores>,
}

impl PollSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn with_command(id: u64, kind: CommandKind) -> Self {
        Self {
            command_id: id,
            command: Some(kind),
            scores: None,
        }
    }

    pub fn scores(mut self, left: i64, right: i64) -> Self {
        self.scores = Some(Scores { left, right });
        self
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PollError> {
        let wire: WireSnapshot = serde_json::from_slice(bytes)?;
        Ok(wire.into())
    }
}

/// Where commands come from. Polled; a push-based source can implement the
/// same trait by returning its latest observed state.
pub trait CommandSource {
    fn poll(&mut self) -> Result<PollSnapshot, PollError>;
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(u64),
    // the reference server stamps commands with a float timestamp
    Float(f64),
}

impl Default for WireId {
    fn default() -> Self {
        WireId::Int(0)
    }
}

impl WireId {
    fn as_u64(self) -> u64 {
        match self {
            WireId::Int(id) => id,
            WireId::Float(stamp) if stamp.is_finite() && stamp > 0.0 => {
                (stamp * 1000.0).trunc() as u64
            }
            WireId::Float(_) => 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireConfig {
    result_duration: Option<u32>,
    global_time_set: Option<u32>,
    global_timer_running: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WireSnapshot {
    #[serde(default)]
    command_id: WireId,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    config: Option<WireConfig>,
    #[serde(default)]
    scores: Option<Scores>,
}

/// Decodes a named command and its payload; the error is the reason it was
/// not understood.
fn decode_command(name: &str, config: &WireConfig) -> Result<CommandKind, String> {
    match name {
        "spin" => Ok(CommandKind::Spin),
        "reset" => Ok(CommandKind::Reset),
        "set_timers" => Ok(CommandKind::SetTimers {
            result_duration_secs: config
                .result_duration
                .ok_or("set_timers without result_duration")?,
            global_time_secs: config
                .global_time_set
                .ok_or("set_timers without global_time_set")?,
        }),
        "control_global_timer" => Ok(CommandKind::ControlGlobalTimer {
            running: config
                .global_timer_running
                .ok_or("control_global_timer without global_timer_running")?,
        }),
        other => Err(format!("unknown command '{other}'")),
    }
}

impl From<WireSnapshot> for PollSnapshot {
    /// A command that can't be understood still carries its id and the
    /// scores; it just has no action.
    fn from(wire: WireSnapshot) -> Self {
        let command_id = wire.command_id.as_u64();

        let command = match wire.command.as_deref() {
            Some(name) if command_id != 0 => {
                let config = wire.config.unwrap_or_default();
                decode_command(name, &config)
                    .inspect_err(|reason| warn!("ignoring command {}: {}", command_id, reason))
                    .ok()
            }
            _ => None,
        };

        PollSnapshot {
            command_id,
            command,
            scores: wire.scores,
        }
    }
}
