mod app;
mod config;
mod domain;
mod input;
mod notifications;
mod persistence;
mod ticker;
mod ui;

use app::{AppState, APP_TITLE};
use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::dial::DIAL_MINUTES;
use domain::{clock_display, cumulative_time, format_clock, DialScene, TaskStore, TimerController};
use notifications::{
    default_audio_player, resolve_sound_path, AudioCue, CommandNotifier, NotificationManager,
    SoundPlayer, TerminalTitle,
};
use persistence::{
    atomic_write, clear_timer, ensure_data_dir, init_local_dir, load_tasks, load_timer,
    storage_file, KeyValueStore,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use ticker::IntervalScheduler;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tickdial")]
#[command(about = "A terminal countdown dial with per-task work sessions", long_about = None)]
struct Cli {
    /// Data directory (defaults to a local .tickdial, then ~/.tickdial)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Sound played when the timer is up
    #[arg(long, global = true)]
    sound: Option<PathBuf>,

    /// Duration in minutes when no timer is saved
    #[arg(long, global = true)]
    minutes: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .tickdial directory in the current directory
    Init,
    /// Print the saved timer and time spent per task
    Status,
    /// Write the current dial as an SVG document
    Dial {
        /// Output file path. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Clear the saved timer (tasks are kept)
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        let dir = init_local_dir()?;
        println!("Initialized tickdial directory: {}", dir.display());
        println!();
        println!("tickdial will now keep its timer and tasks in this directory.");
        println!("Run 'tickdial' to start.");
        return Ok(());
    }

    let data_dir = ensure_data_dir(cli.dir.as_deref())?;
    let config = Config::load(&data_dir)?;
    let _log_guard = init_logging(&data_dir, &config);

    let fallback_total = match cli.minutes {
        Some(minutes) => minutes.clamp(1, DIAL_MINUTES) * 60,
        None => config.default_total_seconds(),
    };

    match cli.command {
        Some(Commands::Status) => print_status(&data_dir, fallback_total),
        Some(Commands::Dial { output }) => export_dial(&data_dir, fallback_total, output),
        Some(Commands::Reset) => {
            let mut storage = KeyValueStore::open(storage_file(&data_dir));
            clear_timer(&mut storage)?;
            info!("cleared saved timer");
            println!("Timer cleared.");
            Ok(())
        }
        Some(Commands::Init) | None => run_tui(&data_dir, &config, cli.sound, fallback_total),
    }
}

/// Log to a daily-rolling file in the data directory; the terminal belongs to the TUI.
/// Precedence: RUST_LOG env var > config file > default "info"
fn init_logging(data_dir: &Path, config: &Config) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into());

    let file_appender = tracing_appender::rolling::daily(data_dir, "tickdial.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    guard
}

fn print_status(data_dir: &Path, fallback_total: u64) -> Result<()> {
    let storage = KeyValueStore::open(storage_file(data_dir));
    let timer = load_timer(&storage, fallback_total);
    let store = TaskStore::new(load_tasks(&storage));

    let state = if timer.running() {
        "running"
    } else if timer.elapsed_seconds > 0 {
        "paused"
    } else {
        "ready"
    };
    println!(
        "Timer: {} ({}, duration {})",
        clock_display(timer.remaining(), timer.overtime()),
        state,
        format_clock(timer.total_seconds)
    );
    println!();
    println!("Tasks:");
    for task in store.tasks() {
        let marker = if store.selected_id() == Some(task.id) {
            "▶"
        } else {
            " "
        };
        println!("  {} {}  {}", marker, task.name, cumulative_time(&task.sessions));
    }
    Ok(())
}

fn export_dial(data_dir: &Path, fallback_total: u64, output: Option<PathBuf>) -> Result<()> {
    let storage = KeyValueStore::open(storage_file(data_dir));
    let timer = load_timer(&storage, fallback_total);
    let svg = DialScene::new(timer.total_seconds, timer.elapsed_seconds, !timer.running()).to_svg();

    match output {
        Some(path) => {
            atomic_write(&path, &svg)?;
            println!("Dial written: {}", path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}

fn run_tui(
    data_dir: &Path,
    config: &Config,
    sound: Option<PathBuf>,
    fallback_total: u64,
) -> Result<()> {
    let storage = KeyValueStore::open(storage_file(data_dir));
    let timer = TimerController::new(
        load_timer(&storage, fallback_total),
        Box::new(IntervalScheduler::new()),
    );
    let store = TaskStore::new(load_tasks(&storage));
    info!(dir = %data_dir.display(), tasks = store.tasks().len(), "starting");

    let sound_path = resolve_sound_path(data_dir, &sound.unwrap_or_else(|| config.sound_file.clone()));
    let player = config
        .audio_player
        .clone()
        .unwrap_or_else(|| default_audio_player().to_string());
    let audio: Option<Box<dyn AudioCue>> = Some(Box::new(SoundPlayer::new(sound_path, player)));
    let notifier = NotificationManager::new(
        APP_TITLE,
        audio,
        Box::new(CommandNotifier::new(config.notifications)),
        Box::new(TerminalTitle),
    );

    let mut app = AppState::new(timer, store, notifier, storage, config.notify_options());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Save on exit
    if let Err(e) = app.save() {
        error!(error = %e, "failed to save on exit");
        eprintln!("Error saving state: {}", e);
    }
    app.shutdown();

    if let Err(err) = result {
        error!(error = %err, "event loop failed");
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let poll_rate = ticker::poll_duration();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(poll_rate)? {
            match event::read()? {
                // Only process key press events (ignore key release)
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if input::handle_key(app, key)? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }

        // Run due ticks and the title flash
        app.pump(Instant::now());

        // Storage failures are logged; the timer keeps going
        if let Err(e) = app.save() {
            error!(error = %e, "failed to save state");
            app.status = Some(format!("Could not save: {}", e));
        }
    }
}
