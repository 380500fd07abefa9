use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use worm::config::{Mode, Settings};
use worm::game::Game;
use worm::term;

fn main() -> Result<()> {
    let settings = Settings::parse();
    init_tracing(settings.log_file.as_deref())?;

    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(mode = ?settings.mode, seed = ?settings.seed, speed = settings.speed, "Starting worm");

    match settings.mode {
        Mode::Terminal => {
            let grid = term::current_terminal_grid(settings.requested_size())?;
            let mut game = Game::new(grid, settings.progression(), settings.speed, rng);
            // The main game loop takes care of restoring the terminal on exit
            term::run(&mut game)?;
        }
        Mode::Window => run_window(&settings, rng)?,
    }

    info!("Bye");
    Ok(())
}

/// The terminal belongs to the game while it runs, so logs only go to stderr
/// when asked for through `RUST_LOG`, or to `--log-file`.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None if std::env::var_os("RUST_LOG").is_some() => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(std::io::stderr)
                .try_init();
        }
        None => {}
    }
    Ok(())
}

#[cfg(feature = "window")]
fn run_window(settings: &Settings, rng: StdRng) -> Result<()> {
    let grid = settings.window_grid()?;
    worm::window::run(Game::new(grid, settings.progression(), settings.speed, rng));
    Ok(())
}

#[cfg(not(feature = "window"))]
fn run_window(_settings: &Settings, _rng: StdRng) -> Result<()> {
    anyhow::bail!("this build has no window mode; rebuild with `--features window`")
}
