use std::mem;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::grid::Grid;
use crate::level::Progression;
use crate::state::{Collision, LevelState, MoveResult};
use crate::worm::Direction::{self, *};

pub const TITLE: &str = "Worm: Neon Garden";

/// Player intent, already decoded from whatever device produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Turn(Direction),
    /// Enter or Space.
    Confirm,
    /// Escape.
    Back,
    /// The `q` key.
    Quit,
    /// Ctrl+C in the terminal. Honoured everywhere. Closing the window ends
    /// the window loop directly and never arrives as an input.
    Terminate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug)]
pub enum Screen {
    Menu,
    Playing(LevelState),
    LevelComplete(LevelState),
    /// Keeps the final board around so it can be shown.
    GameOver(LevelState),
}

/// State that outlives a single level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameContext {
    pub base_speed: u32,
    pub level_index: u32,
    pub total_score: u32,
}

enum TickOutcome {
    Crashed(Collision),
    Cleared,
}

pub struct Game<R> {
    grid: Grid,
    progression: Progression,
    context: GameContext,
    screen: Screen,
    rng: R,
}

impl<R: Rng> Game<R> {
    pub fn new(grid: Grid, progression: Progression, start_speed: u32, rng: R) -> Self {
        let context = GameContext {
            base_speed: progression.clamp_speed(start_speed),
            level_index: 1,
            total_score: 0,
        };
        Game { grid, progression, context, screen: Screen::Menu, rng }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn context(&self) -> &GameContext {
        &self.context
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The level being played or just finished, if any.
    pub fn level(&self) -> Option<&LevelState> {
        match &self.screen {
            Screen::Menu => None,
            Screen::Playing(level) | Screen::LevelComplete(level) | Screen::GameOver(level) => Some(level),
        }
    }

    pub fn handle_input(&mut self, input: Input) -> Flow {
        if input == Input::Terminate {
            return Flow::Exit;
        }

        match self.screen {
            Screen::Menu => match input {
                Input::Turn(Left | Down) => {
                    self.context.base_speed =
                        self.progression.clamp_speed(self.context.base_speed.saturating_sub(1));
                }
                Input::Turn(Right | Up) => {
                    self.context.base_speed = self.progression.clamp_speed(self.context.base_speed + 1);
                }
                Input::Confirm => {
                    self.context.level_index = 1;
                    self.context.total_score = 0;
                    info!(base_speed = self.context.base_speed, "New game");
                    self.start_level();
                }
                _ => {}
            },
            Screen::Playing(ref mut level) => match input {
                Input::Turn(dir) => level.request_direction(dir),
                Input::Back => {
                    info!(level = self.context.level_index, "Level abandoned");
                    self.screen = Screen::Menu;
                }
                _ => {}
            },
            Screen::LevelComplete(_) => {
                if input == Input::Confirm {
                    self.context.level_index += 1;
                    self.start_level();
                }
            }
            Screen::GameOver(_) => match input {
                Input::Confirm => self.screen = Screen::Menu,
                Input::Back | Input::Quit => return Flow::Exit,
                _ => {}
            },
        }

        Flow::Continue
    }

    /// Feeds a frame's worth of real time into the tick clock and runs every
    /// move that falls due. Stops at the first crash or cleared level.
    pub fn update(&mut self, elapsed: Duration) {
        let Screen::Playing(level) = &mut self.screen else {
            return;
        };

        level.accumulate(elapsed);

        let mut outcome = None;
        while level.take_due_move() {
            let res = level.advance(&mut self.rng);
            if let MoveResult::Crashed(collision) = res {
                outcome = Some(TickOutcome::Crashed(collision));
                break;
            }

            if res.ate_food() {
                self.context.total_score += 1;
                debug!(eaten = level.eaten(), target = level.target(), "Food eaten");
            }

            if level.is_complete() {
                outcome = Some(TickOutcome::Cleared);
                break;
            }
        }

        let Some(outcome) = outcome else {
            return;
        };

        let Screen::Playing(level) = mem::replace(&mut self.screen, Screen::Menu) else {
            return;
        };

        match outcome {
            TickOutcome::Crashed(collision) => {
                info!(
                    ?collision,
                    level = self.context.level_index,
                    score = self.context.total_score,
                    "Game over"
                );
                self.screen = Screen::GameOver(level);
            }
            TickOutcome::Cleared => {
                info!(
                    level = self.context.level_index,
                    eaten = level.eaten(),
                    board_full = level.food().is_none(),
                    "Level cleared"
                );
                self.screen = Screen::LevelComplete(level);
            }
        }
    }

    /// Status bar shown above the board while a level is on screen.
    pub fn hud_line(&self) -> Option<String> {
        let level = self.level()?;
        Some(format!(
            "Level {}  |  Speed {}  |  Food {}/{}  |  Score {}",
            self.context.level_index,
            level.speed(),
            level.eaten(),
            level.target(),
            self.context.total_score
        ))
    }

    /// Centred message for the current screen; empty while playing.
    pub fn overlay_lines(&self) -> Vec<String> {
        let progression = &self.progression;
        match &self.screen {
            Screen::Menu => vec![
                TITLE.to_string(),
                format!("Starting Speed: {}", self.context.base_speed),
                format!(
                    "Use arrow keys to change speed ({}-{})",
                    progression.speed_min, progression.speed_max
                ),
                "Press Enter or Space to start".to_string(),
                "Esc can return here during play".to_string(),
            ],
            Screen::Playing(_) => vec![],
            Screen::LevelComplete(_) => {
                let next = progression.derive_level(self.context.level_index + 1, self.context.base_speed);
                vec![
                    format!("Level {} cleared!", self.context.level_index),
                    format!("Next speed: {}", next.speed),
                    "Press Enter or Space for the next level".to_string(),
                ]
            }
            Screen::GameOver(_) => vec![
                "Game Over".to_string(),
                format!("Final Score: {}", self.context.total_score),
                "Press Enter/Space for menu or Q to quit".to_string(),
            ],
        }
    }

    fn start_level(&mut self) {
        let params = self.progression.derive_level(self.context.level_index, self.context.base_speed);
        info!(
            level = self.context.level_index,
            speed = params.speed,
            target = params.target,
            "Level started"
        );
        self.screen = Screen::Playing(LevelState::start(self.grid, params, &mut self.rng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worm::Worm;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game(speed: u32) -> Game<StdRng> {
        let grid = Grid::new(32, 48).unwrap();
        Game::new(grid, Progression::default(), speed, StdRng::seed_from_u64(3))
    }

    fn playing(game: &Game<StdRng>) -> &LevelState {
        match game.screen() {
            Screen::Playing(level) => level,
            other => panic!("expected Playing, got {:?}", other),
        }
    }

    /// Steers a fresh worm onto the food, one move per call. Horizontal
    /// first; a food cell behind the head is reached by turning towards its
    /// row and doubling back on a parallel line.
    fn step_towards_food(game: &mut Game<StdRng>) {
        let level = playing(game);
        let (hr, hc) = level.worm().head();
        let (fr, fc) = level.food().unwrap();
        let wanted = if fc > hc {
            Right
        } else if fc < hc {
            Left
        } else if fr > hr {
            Down
        } else {
            Up
        };

        let turn = if wanted == level.direction().opposite() {
            if fr > hr { Down } else { Up }
        } else {
            wanted
        };
        let _ = game.handle_input(Input::Turn(turn));

        let interval = playing(game).move_interval_ms();
        game.update(Duration::from_nanos((interval * 1_000_000.0).ceil() as u64));
    }

    #[test]
    fn menu_adjusts_speed_within_bounds() {
        let mut game = game(99);
        assert_eq!(game.handle_input(Input::Turn(Up)), Flow::Continue);
        assert_eq!(game.handle_input(Input::Turn(Right)), Flow::Continue);
        assert_eq!(game.context().base_speed, 100);

        let mut game = self::game(2);
        let _ = game.handle_input(Input::Turn(Down));
        let _ = game.handle_input(Input::Turn(Left));
        let _ = game.handle_input(Input::Turn(Left));
        assert_eq!(game.context().base_speed, 1);
    }

    #[test]
    fn starting_speed_is_clamped() {
        assert_eq!(game(0).context().base_speed, 1);
        assert_eq!(game(500).context().base_speed, 100);
    }

    #[test]
    fn confirm_starts_level_one() {
        let mut game = game(20);
        let _ = game.handle_input(Input::Confirm);

        let level = playing(&game);
        assert_eq!(level.speed(), 20);
        assert_eq!(level.target(), 6);
        assert_eq!(game.context().level_index, 1);
        assert_eq!(game.context().total_score, 0);
    }

    #[test]
    fn escape_during_play_returns_to_menu() {
        let mut game = game(20);
        let _ = game.handle_input(Input::Confirm);
        assert_eq!(game.handle_input(Input::Back), Flow::Continue);
        assert!(matches!(game.screen(), Screen::Menu));
        assert!(game.level().is_none());
    }

    #[test]
    fn terminate_exits_from_anywhere() {
        let mut game = game(20);
        assert_eq!(game.handle_input(Input::Terminate), Flow::Exit);
        let _ = game.handle_input(Input::Confirm);
        assert_eq!(game.handle_input(Input::Terminate), Flow::Exit);
    }

    #[test]
    fn quit_key_only_counts_on_game_over() {
        let mut game = game(20);
        assert_eq!(game.handle_input(Input::Quit), Flow::Continue);
        let _ = game.handle_input(Input::Confirm);
        assert_eq!(game.handle_input(Input::Quit), Flow::Continue);
        assert!(matches!(game.screen(), Screen::Playing(_)));
    }

    #[test]
    fn no_moves_until_interval_elapses() {
        let mut game = game(20);
        let _ = game.handle_input(Input::Confirm);
        let head = playing(&game).worm().head();

        game.update(Duration::from_millis(49));
        assert_eq!(playing(&game).worm().head(), head);

        game.update(Duration::from_millis(1));
        assert_eq!(playing(&game).worm().head(), (head.0, head.1 + 1));
    }

    #[test]
    fn catch_up_stops_at_the_wall() {
        let mut game = game(20);
        let _ = game.handle_input(Input::Confirm);

        // 48 columns, head starts at column 26: 21 moves reach column 47.
        game.update(Duration::from_secs(60));

        let Screen::GameOver(level) = game.screen() else {
            panic!("expected GameOver");
        };
        assert_eq!(level.worm().head().1, 47);
        assert!(level.move_accumulator() > 0.0);

        assert_eq!(game.handle_input(Input::Turn(Up)), Flow::Continue);
        assert_eq!(game.handle_input(Input::Confirm), Flow::Continue);
        assert!(matches!(game.screen(), Screen::Menu));
    }

    #[test]
    fn game_over_escape_exits() {
        let mut game = game(20);
        let _ = game.handle_input(Input::Confirm);
        game.update(Duration::from_secs(60));

        assert_eq!(game.handle_input(Input::Back), Flow::Exit);
    }

    #[test]
    fn clearing_a_level_and_moving_on() {
        let grid = Grid::new(32, 48).unwrap();
        let progression = Progression { base_target: 1, target_growth: 1, ..Progression::default() };
        let mut game = Game::new(grid, progression, 20, StdRng::seed_from_u64(11));
        let _ = game.handle_input(Input::Confirm);

        let mut guard = 0;
        while matches!(game.screen(), Screen::Playing(_)) {
            step_towards_food(&mut game);
            guard += 1;
            assert!(guard < 2_000, "worm never cleared the level");
        }

        let Screen::LevelComplete(level) = game.screen() else {
            panic!("expected LevelComplete, got {:?}", game.screen());
        };
        assert_eq!(level.eaten(), 1);
        assert_eq!(level.worm().len(), 6);
        assert_eq!(game.context().total_score, 1);
        assert_eq!(game.overlay_lines()[1], "Next speed: 25");

        let _ = game.handle_input(Input::Confirm);
        let level = playing(&game);
        assert_eq!(game.context().level_index, 2);
        assert_eq!(level.speed(), 25);
        assert_eq!(level.target(), 2);
        assert_eq!(level.eaten(), 0);
        assert_eq!(game.context().total_score, 1);
    }

    #[test]
    fn catch_up_stops_once_the_level_is_cleared() {
        let grid = Grid::new(32, 48).unwrap();
        let progression = Progression { base_target: 1, ..Progression::default() };
        let mut game = Game::new(grid, progression, 20, StdRng::seed_from_u64(4));
        let _ = game.handle_input(Input::Confirm);

        // Food four cells ahead; one long frame would run the worm into the
        // right wall if the loop kept going after the meal.
        let params = progression.derive_level(1, 20);
        let worm = Worm::from_cells((22..27).map(|c| (16, c))).unwrap();
        game.screen = Screen::Playing(LevelState::from_parts(grid, params, worm, Right, Some((16, 30))));

        game.update(Duration::from_secs(60));

        let Screen::LevelComplete(level) = game.screen() else {
            panic!("expected LevelComplete, got {:?}", game.screen());
        };
        assert_eq!(level.worm().len(), 6);
        assert_eq!(level.worm().head(), (16, 30));
        assert_eq!(level.eaten(), 1);
        assert!(level.move_accumulator() > 0.0);
        assert_eq!(game.context().total_score, 1);
    }

    #[test]
    fn hud_and_overlays() {
        let mut game = game(20);
        assert_eq!(game.hud_line(), None);
        assert_eq!(game.overlay_lines()[0], "Worm: Neon Garden");
        assert_eq!(game.overlay_lines()[1], "Starting Speed: 20");

        let _ = game.handle_input(Input::Confirm);
        assert_eq!(
            game.hud_line().unwrap(),
            "Level 1  |  Speed 20  |  Food 0/6  |  Score 0"
        );
        assert!(game.overlay_lines().is_empty());

        game.update(Duration::from_secs(60));
        assert_eq!(game.overlay_lines()[0], "Game Over");
        assert!(game.overlay_lines()[1].starts_with("Final Score: "));
    }
}
