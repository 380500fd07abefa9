use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::grid::{Grid, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::level::{
    Progression, BASE_TARGET, DEFAULT_SPEED, LEVEL_SPEED_STEP, SPEED_MAX, SPEED_MIN, TARGET_GROWTH,
};
use crate::{Cell, GameError, GridInt};

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Play inside the current terminal.
    Terminal,
    /// Play in a desktop window.
    Window,
}

#[derive(Parser, Debug)]
#[command(name = "worm", version, about = "Guide the worm to its food; every level gets faster")]
pub struct Settings {
    /// Where to draw the game.
    #[arg(long, value_enum, env = "WORM_MODE", default_value_t = Mode::Terminal)]
    pub mode: Mode,

    /// Starting speed in moves per second, adjustable in the menu.
    #[arg(
        long,
        env = "WORM_SPEED",
        default_value_t = DEFAULT_SPEED,
        value_parser = clap::value_parser!(u32).range(SPEED_MIN as i64..=SPEED_MAX as i64)
    )]
    pub speed: u32,

    /// Seed for food placement. Random when absent.
    #[arg(long, env = "WORM_SEED")]
    pub seed: Option<u64>,

    /// Board width in cells.
    #[arg(long, env = "WORM_WIDTH")]
    pub width: Option<GridInt>,

    /// Board height in cells.
    #[arg(long, env = "WORM_HEIGHT")]
    pub height: Option<GridInt>,

    /// Speed added per level.
    #[arg(long, env = "WORM_SPEED_STEP", default_value_t = LEVEL_SPEED_STEP)]
    pub speed_step: u32,

    /// Food needed to clear level 1.
    #[arg(long, env = "WORM_BASE_TARGET", default_value_t = BASE_TARGET,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub base_target: u32,

    /// Extra food needed per level after the first.
    #[arg(long, env = "WORM_TARGET_GROWTH", default_value_t = TARGET_GROWTH)]
    pub target_growth: u32,

    /// Append log records to this file. Without it logs go to stderr, and
    /// only when `RUST_LOG` is set.
    #[arg(long, env = "WORM_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn progression(&self) -> Progression {
        Progression {
            level_speed_step: self.speed_step,
            base_target: self.base_target,
            target_growth: self.target_growth,
            ..Progression::default()
        }
    }

    /// Board size asked for on the command line, as `(height, width)`. A
    /// missing dimension takes the default.
    pub fn requested_size(&self) -> Option<Cell> {
        if self.width.is_none() && self.height.is_none() {
            return None;
        }
        Some((self.height.unwrap_or(DEFAULT_HEIGHT), self.width.unwrap_or(DEFAULT_WIDTH)))
    }

    pub fn window_grid(&self) -> Result<Grid, GameError> {
        let (height, width) = self.requested_size().unwrap_or((DEFAULT_HEIGHT, DEFAULT_WIDTH));
        Grid::new(height, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Settings, clap::Error> {
        Settings::try_parse_from(std::iter::once("worm").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let settings = parse(&[]).unwrap();

        assert_eq!(settings.mode, Mode::Terminal);
        assert_eq!(settings.speed, 20);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.requested_size(), None);
        assert_eq!(settings.progression(), Progression::default());

        let grid = settings.window_grid().unwrap();
        assert_eq!((grid.height(), grid.width()), (32, 48));
    }

    #[test]
    fn speed_must_be_in_range() {
        assert!(parse(&["--speed", "0"]).is_err());
        assert!(parse(&["--speed", "101"]).is_err());
        assert_eq!(parse(&["--speed", "100"]).unwrap().speed, 100);
    }

    #[test]
    fn overrides() {
        let settings = parse(&[
            "--mode", "window",
            "--seed", "7",
            "--width", "20",
            "--speed-step", "3",
            "--base-target", "2",
            "--target-growth", "0",
        ])
        .unwrap();

        assert_eq!(settings.mode, Mode::Window);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.requested_size(), Some((32, 20)));

        let params = settings.progression().derive_level(3, 10);
        assert_eq!(params.speed, 16);
        assert_eq!(params.target, 2);
    }

    #[test]
    fn zero_target_is_rejected() {
        assert!(parse(&["--base-target", "0"]).is_err());
    }
}
