use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::command::{Command, CommandKind, CommandSource};
use crate::config::{Config, Scores};
use crate::scheduler::{Scheduler, TaskId};
use crate::sector::SectorModel;
use crate::sync::{CommandSynchronizer, CommandTarget, PollOutcome};
use crate::timers::{CountdownTick, ResultCountdown};
use crate::wheel::{self, Phase, RevealStep, SpinRejection, Transition, Wheel};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const TIMER_TICK: Duration = Duration::from_secs(1);

/// Everything that runs on the widget's clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timed {
    Poll,
    MatchClockTick,
    CountdownTick,
    Reveal(RevealStep),
}

impl From<RevealStep> for Timed {
    fn from(step: RevealStep) -> Self {
        Timed::Reveal(step)
    }
}

/// Mutable presentation state, handed by reference to every handler
#[derive(Debug)]
pub struct WidgetState {
    sched: Scheduler<Timed>,
    wheel: Wheel,
    countdown: ResultCountdown,
    countdown_task: Option<TaskId>,
    config: Config,
    rng: StdRng,
}

impl WidgetState {
    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    pub fn countdown(&self) -> &ResultCountdown {
        &self.countdown
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.wheel.phase()
    }

    /// Time since mount on the widget's clock
    pub fn now(&self) -> Duration {
        self.sched.now()
    }

    pub fn spin(&mut self) -> Result<(), SpinRejection> {
        // draw the increment only once the guard passes, so ignored spins
        // leave the random sequence untouched
        self.wheel.can_spin().inspect_err(|rejection| {
            debug!("spin ignored: {:?}", rejection);
        })?;
        let increment = wheel::spin_increment(&mut self.rng);
        self.wheel.spin(increment, &mut self.sched)
    }

    pub fn reset(&mut self) {
        self.wheel.reset(&mut self.sched);
        self.stop_countdown();
    }

    fn start_countdown(&mut self) {
        self.stop_countdown();
        self.countdown.start(self.config.result_duration_secs);
        self.countdown_task = Some(self.sched.every(TIMER_TICK, Timed::CountdownTick));
        info!(
            "result countdown started at {}",
            self.countdown.display()
        );
    }

    fn stop_countdown(&mut self) {
        if let Some(id) = self.countdown_task.take() {
            self.sched.cancel(id);
        }
        self.countdown.disarm(self.config.result_duration_secs);
    }

    fn on_timer(&mut self, task: Timed) {
        match task {
            Timed::Poll => {}
            Timed::MatchClockTick => self.config.match_clock.tick(),
            Timed::CountdownTick => {
                if self.countdown.tick() == CountdownTick::Expired {
                    info!("result countdown expired, resetting");
                    self.reset();
                }
            }
            Timed::Reveal(step) => {
                if let Some(Transition::ResultShown { .. }) = self.wheel.on_step(step, &mut self.sched)
                {
                    self.start_countdown();
                }
            }
        }
    }
}

impl CommandTarget for WidgetState {
    fn apply_scores(&mut self, scores: Scores) {
        self.config.scores = scores;
    }

    fn dispatch(&mut self, command: Command) {
        match command.kind {
            CommandKind::Spin => {
                let _ = self.spin();
            }
            CommandKind::Reset => self.reset(),
            CommandKind::SetTimers {
                result_duration_secs,
                global_time_secs,
            } => {
                self.config
                    .set_timers(result_duration_secs, global_time_secs);
                // a running countdown keeps going; the idle display follows the new duration
                if !self.countdown.is_active() {
                    self.countdown.disarm(result_duration_secs);
                }
            }
            CommandKind::ControlGlobalTimer { running } => {
                self.config.match_clock.set_running(running);
            }
        }
    }
}

/// The mounted widget: presentation state plus the command synchronizer.
///
/// Mounting schedules the poll cadence and the match clock tick; dropping the
/// widget tears everything down.
#[derive(Debug)]
pub struct PrizeWheel {
    state: WidgetState,
    sync: CommandSynchronizer,
}

impl PrizeWheel {
    pub fn mount(sectors: SectorModel, config: Config, poll_interval: Duration) -> Self {
        Self::mount_with_rng(sectors, config, poll_interval, StdRng::from_entropy())
    }

    pub fn mount_with_rng(
        sectors: SectorModel,
        config: Config,
        poll_interval: Duration,
        rng: StdRng,
    ) -> Self {
        let mut sched = Scheduler::new();
        sched.every(poll_interval, Timed::Poll);
        sched.every(TIMER_TICK, Timed::MatchClockTick);

        if sectors.is_empty() {
            info!("mounted with an empty wheel; spins are disabled");
        } else {
            info!("mounted with {} sectors", sectors.len());
        }

        Self {
            state: WidgetState {
                sched,
                wheel: Wheel::new(sectors),
                countdown: ResultCountdown::new(config.result_duration_secs),
                countdown_task: None,
                config,
                rng,
            },
            sync: CommandSynchronizer::new(),
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn last_applied_command(&self) -> u64 {
        self.sync.last_applied()
    }

    /// Local operator spin, guarded like a remote one
    pub fn request_spin(&mut self) -> Result<(), SpinRejection> {
        self.state.spin()
    }

    pub fn request_reset(&mut self) {
        self.state.reset();
    }

    /// Runs every task that falls due within `elapsed`, polling `source` on
    /// each poll cycle. Returns the outcomes of the polls that ran.
    pub fn advance<S>(&mut self, elapsed: Duration, source: &mut S) -> Vec<PollOutcome>
    where
        S: CommandSource + ?Sized,
    {
        let until = self.state.sched.now() + elapsed;
        let mut polls = Vec::new();
        while let Some(task) = self.state.sched.next_due(until) {
            match task {
                Timed::Poll => polls.push(self.sync.poll(source, &mut self.state)),
                other => self.state.on_timer(other),
            }
        }
        polls
    }
}
