use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyEventKind, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use hovertrace::{
    app::{App, AppSettings, Flow},
    app_dirs::AppDirs,
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    replay::ReplayStrategy,
    runtime::{CrosstermEventSource, FixedTicker, Runner, SurveyEvent},
    survey::{Questionnaire, SurveyMode},
    ui::screen::current_screen,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{fmt::MakeWriter, util::{SubscriberInitExt, TryInitError}, EnvFilter};

const TICK_RATE_MS: u64 = 100;

/// terminal survey that records your pointer trail and replays it
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal survey that records pointer movement around answer selections, then replays the trail with pre/during/post timing metrics per question."
)]
pub struct Cli {
    /// survey mode: one question or several
    #[clap(short, long, value_enum)]
    mode: Option<SurveyMode>,

    /// JSON file with [{id, title, answers}] replacing the built-in questions
    #[clap(short, long)]
    questions: Option<PathBuf>,

    /// replay pacing: one sample per tick, or the recorded timing
    #[clap(short, long, value_enum)]
    replay: Option<ReplayStrategy>,

    /// milliseconds between samples for fixed-tick replay
    #[clap(long)]
    tick_ms: Option<u64>,

    /// gaps longer than this many milliseconds get a pause marker
    #[clap(long)]
    pause_threshold_ms: Option<u64>,

    /// skip pointer samples that repeat the previous position
    #[clap(long)]
    dedupe: bool,

    /// print the last submitted session as JSON after quitting
    #[clap(long)]
    summary: bool,

    /// write the resolved settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags override the stored config
    fn resolve(&self, base: Config) -> Config {
        Config {
            mode: self.mode.unwrap_or(base.mode),
            replay_strategy: self.replay.unwrap_or(base.replay_strategy),
            tick_ms: self.tick_ms.unwrap_or(base.tick_ms),
            pause_threshold_ms: self.pause_threshold_ms.unwrap_or(base.pause_threshold_ms),
            dedupe_samples: self.dedupe || base.dedupe_samples,
        }
    }
}

fn install_subscriber<W>(filter: EnvFilter, writer: W) -> Result<(), TryInitError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .finish()
        .try_init()
}

fn init_logging() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_env("HOVERTRACE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("hovertrace=info"));

    let file = AppDirs::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match file {
        Some(file) => install_subscriber(filter, Mutex::new(file)),
        None => install_subscriber(filter, io::sink),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // the survey still works without a log file, so only report it
    if let Err(err) = init_logging() {
        eprintln!("logging disabled: {err}");
    }

    let store = FileConfigStore::new();
    let config = cli.resolve(store.load());
    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "config saved");
    }

    let custom_questions = cli
        .questions
        .as_ref()
        .map(|path| Questionnaire::from_path(config.mode, path))
        .transpose()?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let clock = SystemClock::new();
    let size = terminal.size()?;
    let mut app = App::new(
        AppSettings::from(&config),
        custom_questions,
        Rect::new(0, 0, size.width, size.height),
        clock.now(),
    );
    let result = start_tui(&mut terminal, &mut app, &clock);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result?;

    if cli.summary {
        if let Some(summary) = app.summary() {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
    }

    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    clock: &dyn Clock,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        let wait = app
            .next_deadline()
            .map_or(Duration::from_millis(TICK_RATE_MS), |deadline| {
                Duration::from_millis(deadline.saturating_sub(clock.now()))
            });

        let mut redraw = match runner.step_within(wait) {
            SurveyEvent::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    false
                } else if app.on_key(key, clock.now()) == Flow::Quit {
                    break;
                } else {
                    true
                }
            }
            SurveyEvent::Mouse(mouse) => {
                app.on_mouse(mouse, clock.now());
                !matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_))
            }
            SurveyEvent::Resize(width, height) => {
                app.on_resize(width, height);
                true
            }
            SurveyEvent::Tick => false,
        };

        redraw |= app.fire_due_timers(clock.now());

        if redraw {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    current_screen(app.view()).render(app, f);
}
