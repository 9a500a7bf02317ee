use log::{debug, info, warn};

use crate::command::{Command, CommandSource, PollSnapshot};
use crate::config::Scores;

/// Receiver of synchronized state. Scores are applied before any command.
pub trait CommandTarget {
    fn apply_scores(&mut self, scores: Scores);
    fn dispatch(&mut self, command: Command);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Applied(Command),
    /// A new id without a command kind; recorded but nothing to do
    Acknowledged(u64),
    NoCommand,
    Failed,
}

/// Deduplicates remote commands by id. At most one command is dispatched per
/// snapshot and each id is dispatched at most once; ids skipped between polls
/// are never seen.
#[derive(Debug, Clone, Default)]
pub struct CommandSynchronizer {
    last_applied: u64,
}

impl CommandSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_applied(&self) -> u64 {
        self.last_applied
    }

    pub fn poll<S, T>(&mut self, source: &mut S, target: &mut T) -> PollOutcome
    where
        S: CommandSource + ?Sized,
        T: CommandTarget + ?Sized,
    {
        match source.poll() {
            Ok(snapshot) => self.process(&snapshot, target),
            Err(err) => {
                // retried on the next cycle, nothing shown
                debug!("poll failed: {}", err);
                PollOutcome::Failed
            }
        }
    }

    pub fn process<T>(&mut self, snapshot: &PollSnapshot, target: &mut T) -> PollOutcome
    where
        T: CommandTarget + ?Sized,
    {
        if let Some(scores) = snapshot.scores {
            target.apply_scores(scores);
        }

        let id = snapshot.command_id;
        if id == 0 || id == self.last_applied {
            return PollOutcome::NoCommand;
        }
        if id < self.last_applied {
            warn!(
                "ignoring command {} older than last applied {}",
                id, self.last_applied
            );
            return PollOutcome::NoCommand;
        }

        self.last_applied = id;
        match snapshot.command {
            Some(kind) => {
                let command = Command { id, kind };
                info!("applying command {} ({})", id, kind);
                target.dispatch(command);
                PollOutcome::Applied(command)
            }
            None => {
                debug!("command {} carries no action", id);
                PollOutcome::Acknowledged(id)
            }
        }
    }
}
