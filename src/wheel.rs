use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::scheduler::{Scheduler, TaskId};
use crate::sector::{Sector, SectorModel};
use crate::winner;

/// Visual spin length; the render adapter animates over exactly this long
pub const SPIN_DURATION: Duration = Duration::from_millis(5000);
/// After resolution, the wheel fades out
pub const HIDE_WHEEL_DELAY: Duration = Duration::from_millis(500);
/// After resolution, the winner moves to the top and the countdown starts
pub const MOVE_TO_TOP_DELAY: Duration = Duration::from_millis(2500);

/// Five full turns
pub const MIN_SPIN_DEG: f64 = 1800.0;
/// Up to one extra turn on top of the minimum
pub const SPIN_JITTER_DEG: f64 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Spinning,
    RevealTransit,
    ResultShown,
}

/// Timed steps of the reveal sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    Resolve,
    HideWheel,
    MoveToTop,
}

/// Why a spin request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinRejection {
    NoSectors,
    Busy(Phase),
}

/// Observable result of a reveal step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Revealed { winner: usize },
    WheelHidden,
    ResultShown { winner: usize },
}

/// Rotation the wheel is moving through, for the render adapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinMotion {
    pub from_deg: f64,
    pub to_deg: f64,
    pub started_at: Duration,
}

pub fn spin_increment<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    MIN_SPIN_DEG + rng.gen_range(0.0..SPIN_JITTER_DEG)
}

/// Spin/reveal phase machine.
///
/// Timed transitions are scheduled on the owner's [`Scheduler`]; whatever task
/// type the owner uses only has to wrap [`RevealStep`].
#[derive(Debug, Clone)]
pub struct Wheel {
    sectors: SectorModel,
    cumulative_rotation_deg: f64,
    phase: Phase,
    wheel_visible: bool,
    winner: Option<usize>,
    motion: Option<SpinMotion>,
    pending: Vec<TaskId>,
}

impl Wheel {
    pub fn new(sectors: SectorModel) -> Self {
        Self {
            sectors,
            cumulative_rotation_deg: 0.0,
            phase: Phase::Idle,
            wheel_visible: true,
            winner: None,
            motion: None,
            pending: Vec::new(),
        }
    }

    pub fn sectors(&self) -> &SectorModel {
        &self.sectors
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cumulative_rotation_deg(&self) -> f64 {
        self.cumulative_rotation_deg
    }

    pub fn is_wheel_visible(&self) -> bool {
        self.wheel_visible
    }

    pub fn motion(&self) -> Option<SpinMotion> {
        self.motion
    }

    pub fn winner(&self) -> Option<&Sector> {
        self.winner.and_then(|i| self.sectors.get(i))
    }

    pub fn winner_index(&self) -> Option<usize> {
        self.winner
    }

    pub fn can_spin(&self) -> Result<(), SpinRejection> {
        if self.sectors.is_empty() {
            return Err(SpinRejection::NoSectors);
        }
        if self.phase != Phase::Idle || !self.wheel_visible {
            return Err(SpinRejection::Busy(self.phase));
        }
        Ok(())
    }

    /// Starts a spin by `increment_deg` (forward only). Rejected spins leave
    /// the state untouched.
    pub fn spin<T>(
        &mut self,
        increment_deg: f64,
        sched: &mut Scheduler<T>,
    ) -> Result<(), SpinRejection>
    where
        T: Clone + From<RevealStep>,
    {
        self.can_spin()?;

        let from_deg = self.cumulative_rotation_deg;
        self.cumulative_rotation_deg += increment_deg.abs();
        self.phase = Phase::Spinning;
        self.winner = None;
        self.motion = Some(SpinMotion {
            from_deg,
            to_deg: self.cumulative_rotation_deg,
            started_at: sched.now(),
        });
        self.pending = vec![sched.after(SPIN_DURATION, RevealStep::Resolve.into())];

        info!(
            "spin started: {:.1}deg -> {:.1}deg",
            from_deg, self.cumulative_rotation_deg
        );
        Ok(())
    }

    /// Handles a fired reveal step. Steps that no longer match the phase are
    /// dropped.
    pub fn on_step<T>(&mut self, step: RevealStep, sched: &mut Scheduler<T>) -> Option<Transition>
    where
        T: Clone + From<RevealStep>,
    {
        match (step, self.phase) {
            (RevealStep::Resolve, Phase::Spinning) => {
                let winner = winner::resolve(self.cumulative_rotation_deg, self.sectors.len())?;
                self.winner = Some(winner);
                self.phase = Phase::RevealTransit;
                self.pending = vec![
                    sched.after(HIDE_WHEEL_DELAY, RevealStep::HideWheel.into()),
                    sched.after(MOVE_TO_TOP_DELAY, RevealStep::MoveToTop.into()),
                ];
                info!(
                    "winner resolved: #{} '{}'",
                    winner,
                    self.winner().map(|s| s.label.as_str()).unwrap_or_default()
                );
                Some(Transition::Revealed { winner })
            }
            (RevealStep::HideWheel, Phase::RevealTransit) => {
                self.wheel_visible = false;
                Some(Transition::WheelHidden)
            }
            (RevealStep::MoveToTop, Phase::RevealTransit) => {
                let winner = self.winner?;
                self.wheel_visible = false;
                self.phase = Phase::ResultShown;
                self.pending.clear();
                debug!("result shown for #{}", winner);
                Some(Transition::ResultShown { winner })
            }
            (step, phase) => {
                debug!("dropping stale reveal step {:?} in {}", step, phase);
                None
            }
        }
    }

    /// Back to Idle from any phase, cancelling outstanding reveal steps.
    /// Rotation is kept so the next spin continues from where the wheel stopped.
    pub fn reset<T: Clone>(&mut self, sched: &mut Scheduler<T>) {
        for id in self.pending.drain(..) {
            sched.cancel(id);
        }
        if self.phase != Phase::Idle {
            info!("wheel reset from {}", self.phase);
        }
        self.phase = Phase::Idle;
        self.wheel_visible = true;
        self.winner = None;
    }
}
