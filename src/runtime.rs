use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::command::{CommandSource, PollSnapshot};
use crate::error::PollError;

/// UI redraw cadence; the widget clock is advanced on every tick
pub const TICK_RATE_MS: u64 = 50;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum WheelEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait WheelEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<WheelEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<WheelEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(WheelEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(WheelEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl WheelEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<WheelEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runs a blocking command source on its own thread at a fixed cadence.
///
/// The UI loop polls this instead of the network: it only drains whatever
/// answers have arrived, so a slow or dead server never stalls a frame.
/// Answers that arrive between two polls are coalesced to the latest.
pub struct BackgroundCommandSource {
    rx: Receiver<Result<PollSnapshot, PollError>>,
    latest: Option<PollSnapshot>,
}

impl BackgroundCommandSource {
    pub fn spawn<S>(mut source: S, interval: Duration) -> Self
    where
        S: CommandSource + Send + 'static,
    {
        let interval = interval.max(Duration::from_millis(1));
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let started = Instant::now();
            if tx.send(source.poll()).is_err() {
                break;
            }
            std::thread::sleep(interval.saturating_sub(started.elapsed()));
        });

        Self { rx, latest: None }
    }
}

impl CommandSource for BackgroundCommandSource {
    fn poll(&mut self) -> Result<PollSnapshot, PollError> {
        let mut answer = None;
        while let Ok(result) = self.rx.try_recv() {
            answer = Some(result);
        }

        match answer {
            Some(Ok(snapshot)) => {
                self.latest = Some(snapshot.clone());
                Ok(snapshot)
            }
            Some(Err(err)) => {
                self.latest = None;
                Err(err)
            }
            // nothing new: repeat the last good answer, dedup makes it harmless
            None => self.latest.clone().ok_or(PollError::NoResponse),
        }
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Measures wall time between frames so the widget clock follows real time
/// even when key events cut a tick short.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Time since the previous lap (or since start)
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<WheelEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<WheelEvent>) -> Self {
        Self { rx }
    }
}

impl WheelEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<WheelEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: WheelEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: WheelEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> WheelEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => WheelEvent::Tick,
        }
    }
}
