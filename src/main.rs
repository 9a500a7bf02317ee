mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use prizewheel::{
    app_dirs::AppDirs,
    assets::{load_wheel, DirectoryWheelSource, FileImageResolver},
    command::CommandSource,
    config::Config,
    error::LoadError,
    logging,
    remote::{self, HttpCommandSource, HttpWheelSource},
    runtime::{
        BackgroundCommandSource, CrosstermEventSource, FixedTicker, FrameClock, Runner, Ticker,
        WheelEvent, WheelEventSource,
    },
    sector::SectorModel,
    settings::{FileSettingsStore, Settings, SettingsStore},
    sync::PollOutcome,
    wheel::SpinRejection,
    widget::PrizeWheel,
};

/// remote-controlled prize wheel for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "A prize wheel presentation driven by a control server: spins, reveals the winner with a countdown, and shows the match clock and scores."
)]
pub struct Cli {
    /// base url of the control server
    #[clap(long)]
    server: Option<String>,

    /// how often to poll the control server, in milliseconds
    #[clap(long = "poll-interval-ms")]
    poll_interval_ms: Option<u64>,

    /// seconds the winner stays on screen before the wheel resets
    #[clap(short = 'r', long = "result-duration")]
    result_duration: Option<u32>,

    /// starting match clock, in seconds
    #[clap(short = 'g', long = "global-time")]
    global_time: Option<u32>,

    /// load prizes from a local directory instead of the server
    #[clap(short = 'd', long = "wheel-dir")]
    wheel_dir: Option<PathBuf>,

    /// log level written to the log file (error, warn, info, debug, trace)
    #[clap(long = "log-level")]
    log_level: Option<String>,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_settings: bool,
}

impl Cli {
    /// Flags win over stored settings
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(server) = &self.server {
            settings.server_url = server.clone();
        }
        if let Some(ms) = self.poll_interval_ms {
            settings.poll_interval_ms = ms;
        }
        if let Some(secs) = self.result_duration {
            settings.result_duration_secs = secs;
        }
        if let Some(secs) = self.global_time {
            settings.global_time_secs = secs;
        }
        if let Some(dir) = &self.wheel_dir {
            settings.wheel_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            settings.log_level = level.clone();
        }
        settings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connecting,
    Online,
    Offline,
}

pub struct App {
    pub wheel: PrizeWheel,
    source: Box<dyn CommandSource>,
    pub link: LinkStatus,
    pub notice: Option<String>,
}

impl App {
    pub fn new(wheel: PrizeWheel, source: Box<dyn CommandSource>) -> Self {
        Self {
            wheel,
            source,
            link: LinkStatus::Connecting,
            notice: None,
        }
    }

    /// Moves the widget clock forward, polling as the cadence comes due
    pub fn advance(&mut self, elapsed: Duration) {
        let outcomes = self.wheel.advance(elapsed, self.source.as_mut());
        if let Some(last) = outcomes.last() {
            self.link = match last {
                PollOutcome::Failed => LinkStatus::Offline,
                _ => LinkStatus::Online,
            };
        }
        for outcome in outcomes {
            if let PollOutcome::Applied(command) = outcome {
                self.notice = Some(format!("remote: {}", command.kind));
            }
        }
    }

    /// Returns true when the operator asked to quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char(' ') | KeyCode::Char('s') => {
                self.notice = match self.wheel.request_spin() {
                    Ok(()) => None,
                    Err(SpinRejection::NoSectors) => Some("no prizes to spin".to_string()),
                    Err(SpinRejection::Busy(phase)) => Some(format!("busy: {}", phase)),
                };
            }
            KeyCode::Char('r') => {
                self.wheel.request_reset();
                self.notice = None;
            }
            _ => {}
        }
        false
    }
}

fn load_sectors(settings: &Settings) -> SectorModel {
    let loaded: Result<SectorModel, LoadError> = match &settings.wheel_dir {
        Some(dir) => load_wheel(&DirectoryWheelSource::new(dir), &FileImageResolver::new(dir)),
        None => HttpWheelSource::new(&settings.server_url).and_then(|source| {
            let resolver = source.image_resolver();
            load_wheel(&source, &resolver)
        }),
    };

    loaded.unwrap_or_else(|err| {
        warn!("wheel data unavailable, starting empty: {}", err);
        SectorModel::build(Vec::new())
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileSettingsStore::new();
    let settings = cli.apply(store.load());
    if cli.save_settings {
        store.save(&settings)?;
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(err) = logging::init(&path, &settings.log_level) {
            eprintln!("logging disabled: {}", err);
        }
    }
    info!("starting with {:?}", settings);

    let sectors = load_sectors(&settings);
    let poll_interval = Duration::from_millis(settings.poll_interval_ms);
    let http = HttpCommandSource::new(&settings.server_url, remote::poll_timeout(poll_interval))?;
    let source = BackgroundCommandSource::spawn(http, poll_interval);
    let config = Config::new(settings.result_duration_secs, settings.global_time_secs);
    let wheel = PrizeWheel::mount(sectors, config, poll_interval);
    let mut app = App::new(wheel, Box::new(source));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let res = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("stopped");
    res
}

fn start_tui<B, E, T>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    E: WheelEventSource,
    T: Ticker,
{
    let mut clock = FrameClock::start();

    loop {
        terminal.draw(|f| ui(app, f))?;

        let event = runner.step();
        app.advance(clock.lap());

        match event {
            WheelEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
            WheelEvent::Resize | WheelEvent::Tick => {}
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use prizewheel::{
        command::{CommandKind, PollSnapshot},
        error::PollError,
        sector::{ImageHandle, ResolvedEntry},
        wheel::Phase,
    };
    use rand::{rngs::StdRng, SeedableRng};
    use ratatui::{backend::TestBackend, Terminal};

    /// Replays a fixed list of answers, then stays on the last one
    struct Scripted(Vec<Result<PollSnapshot, u16>>);

    impl CommandSource for Scripted {
        fn poll(&mut self) -> Result<PollSnapshot, PollError> {
            let next = if self.0.len() > 1 {
                self.0.remove(0)
            } else {
                self.0[0].clone()
            };
            next.map_err(PollError::Status)
        }
    }

    fn sectors(labels: &[&str]) -> SectorModel {
        SectorModel::build(
            labels
                .iter()
                .map(|label| ResolvedEntry {
                    image: ImageHandle {
                        reference: format!("{}.png", label.to_lowercase()),
                        byte_len: 64,
                    },
                    label: label.to_string(),
                })
                .collect(),
        )
    }

    fn app_with(labels: &[&str], script: Vec<Result<PollSnapshot, u16>>) -> App {
        let wheel = PrizeWheel::mount_with_rng(
            sectors(labels),
            Config::new(60, 90),
            Duration::from_millis(500),
            StdRng::seed_from_u64(7),
        );
        App::new(wheel, Box::new(Scripted(script)))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn rendered(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["prizewheel"]);
        assert_eq!(cli.server, None);
        assert_eq!(cli.poll_interval_ms, None);
        assert_eq!(cli.wheel_dir, None);
        assert!(!cli.save_settings);
        assert_eq!(cli.apply(Settings::default()), Settings::default());
    }

    #[test]
    fn test_cli_overrides_settings() {
        let cli = Cli::parse_from([
            "prizewheel",
            "--server",
            "http://10.0.0.2:5000",
            "--poll-interval-ms",
            "250",
            "-r",
            "30",
            "-g",
            "600",
            "-d",
            "/srv/prizes",
            "--log-level",
            "debug",
        ]);
        let settings = cli.apply(Settings::default());
        assert_eq!(settings.server_url, "http://10.0.0.2:5000");
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(settings.result_duration_secs, 30);
        assert_eq!(settings.global_time_secs, 600);
        assert_eq!(settings.wheel_dir, Some(PathBuf::from("/srv/prizes")));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_cli_rejects_bad_numbers() {
        assert!(Cli::try_parse_from(["prizewheel", "--result-duration", "soon"]).is_err());
    }

    #[test]
    fn test_load_sectors_from_empty_dir_is_inert() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            wheel_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        assert!(load_sectors(&settings).is_empty());
    }

    #[test]
    fn test_keys_spin_reset_quit() {
        let mut app = app_with(&["Cap", "Mug"], vec![Ok(PollSnapshot::idle())]);

        assert!(!app.on_key(key(KeyCode::Char(' '))));
        assert_eq!(app.wheel.state().phase(), Phase::Spinning);

        assert!(!app.on_key(key(KeyCode::Char('s'))));
        assert_eq!(app.notice.as_deref(), Some("busy: Spinning"));

        assert!(!app.on_key(key(KeyCode::Char('r'))));
        assert_eq!(app.wheel.state().phase(), Phase::Idle);
        assert_eq!(app.notice, None);

        assert!(app.on_key(key(KeyCode::Char('q'))));
        assert!(app.on_key(key(KeyCode::Esc)));
        assert!(app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_spin_key_on_empty_wheel_sets_notice() {
        let mut app = app_with(&[], vec![Ok(PollSnapshot::idle())]);
        app.on_key(key(KeyCode::Char(' ')));
        assert_eq!(app.wheel.state().phase(), Phase::Idle);
        assert_eq!(app.notice.as_deref(), Some("no prizes to spin"));
    }

    #[test]
    fn test_link_status_follows_polls() {
        let mut app = app_with(
            &["Cap"],
            vec![Err(503), Ok(PollSnapshot::idle().scores(2, 1))],
        );
        assert_eq!(app.link, LinkStatus::Connecting);

        app.advance(Duration::from_millis(500));
        assert_eq!(app.link, LinkStatus::Offline);

        app.advance(Duration::from_millis(500));
        assert_eq!(app.link, LinkStatus::Online);
        assert_eq!(app.wheel.state().config().scores.left, 2);
    }

    #[test]
    fn test_remote_spin_sets_notice() {
        let mut app = app_with(
            &["Cap", "Mug"],
            vec![Ok(PollSnapshot::with_command(3, CommandKind::Spin))],
        );
        app.advance(Duration::from_millis(500));
        assert_eq!(app.wheel.state().phase(), Phase::Spinning);
        assert_eq!(app.notice.as_deref(), Some("remote: Spin"));
    }

    #[test]
    fn test_ui_empty_wheel() {
        let app = app_with(&[], vec![Ok(PollSnapshot::idle())]);
        let content = rendered(&app);
        assert!(content.contains("No prizes loaded"));
        assert!(content.contains("01:30"));
        assert!(content.contains("(q)uit"));
    }

    #[test]
    fn test_ui_idle_wheel_shows_pointer_and_scores() {
        let mut app = app_with(&["Cap", "Mug"], vec![Ok(PollSnapshot::idle().scores(4, 7))]);
        app.advance(Duration::from_millis(500));
        let content = rendered(&app);
        assert!(content.contains("▼"));
        assert!(content.contains("4  :  7"));
        assert!(content.contains("online"));
    }

    #[test]
    fn test_ui_result_shows_winner_and_countdown() {
        let mut app = app_with(&["Cap", "Mug", "Scarf"], vec![Ok(PollSnapshot::idle())]);
        app.on_key(key(KeyCode::Char(' ')));
        app.advance(Duration::from_millis(7_500));
        assert_eq!(app.wheel.state().phase(), Phase::ResultShown);

        let winner = app.wheel.state().wheel().winner().unwrap().label.clone();
        let content = rendered(&app);
        assert!(content.contains(&winner));
        assert!(content.contains("01:00"));
        assert!(!content.contains("▼"));
    }

    #[test]
    fn test_ui_unlabelled_winner_reads_winner() {
        let mut app = app_with(&[""], vec![Ok(PollSnapshot::idle())]);
        app.on_key(key(KeyCode::Char(' ')));
        app.advance(Duration::from_millis(7_500));
        assert!(rendered(&app).contains("WINNER"));
    }
}
