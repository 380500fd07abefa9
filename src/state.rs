use std::time::Duration;

use rand::Rng;

use crate::food::place_food;
use crate::grid::Grid;
use crate::level::LevelParams;
use crate::worm::{Direction, Worm, INITIAL_WORM_LENGTH};
use crate::Cell;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    /// `old_tail` is `None` when the worm ate and grew.
    Moved { new_head: Cell, old_head: Cell, old_tail: Option<Cell> },
    Crashed(Collision),
}

impl MoveResult {
    pub fn is_alive(&self) -> bool {
        matches!(self, Moved { .. })
    }

    pub fn ate_food(&self) -> bool {
        matches!(self, Moved { old_tail: None, .. })
    }
}

/// Everything that lives for one level: the worm, its food and the tick clock.
#[derive(Clone, Debug)]
pub struct LevelState {
    grid: Grid,
    worm: Worm,
    direction: Direction,
    pending_direction: Direction,
    food: Option<Cell>,
    eaten: u32,
    params: LevelParams,
    move_accumulator: f64,
}

impl LevelState {
    /// Fresh worm in the middle of the board with food placed around it.
    pub fn start<R: Rng + ?Sized>(grid: Grid, params: LevelParams, rng: &mut R) -> Self {
        let worm = Worm::centered(&grid, INITIAL_WORM_LENGTH);
        let food = place_food(&grid, worm.occupied(), rng);
        LevelState::from_parts(grid, params, worm, Direction::Right, food)
    }

    pub fn from_parts(
        grid: Grid,
        params: LevelParams,
        worm: Worm,
        direction: Direction,
        food: Option<Cell>,
    ) -> Self {
        LevelState {
            grid,
            worm,
            direction,
            pending_direction: direction,
            food,
            eaten: 0,
            params,
            move_accumulator: 0.0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn worm(&self) -> &Worm {
        &self.worm
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn eaten(&self) -> u32 {
        self.eaten
    }

    pub fn target(&self) -> u32 {
        self.params.target
    }

    pub fn speed(&self) -> u32 {
        self.params.speed
    }

    pub fn move_interval_ms(&self) -> f64 {
        self.params.move_interval_ms
    }

    pub fn move_accumulator(&self) -> f64 {
        self.move_accumulator
    }

    /// Queues a turn for the next move. Turning straight back is ignored; the
    /// check is against the direction of the last move actually made, so two
    /// quick turns within one tick can't reverse the worm onto its neck.
    pub fn request_direction(&mut self, new_direction: Direction) {
        if new_direction != self.direction.opposite() {
            self.pending_direction = new_direction;
        }
    }

    /// Level is won once the target is met or there is nowhere left for food.
    pub fn is_complete(&self) -> bool {
        self.eaten >= self.params.target || self.food.is_none()
    }

    pub(crate) fn accumulate(&mut self, elapsed: Duration) {
        self.move_accumulator += elapsed.as_nanos() as f64 / 1_000_000.0;
    }

    /// Takes one interval off the clock if a move is due.
    pub(crate) fn take_due_move(&mut self) -> bool {
        if self.move_accumulator >= self.params.move_interval_ms {
            self.move_accumulator -= self.params.move_interval_ms;
            true
        } else {
            false
        }
    }

    /// Moves the worm one cell in the pending direction.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> MoveResult {
        let old_head = self.worm.head();
        let new_head = self.pending_direction.step(old_head);

        if !self.grid.contains(new_head) {
            return Crashed(Collision::Wall);
        }

        // The tail still counts: it hasn't moved out of the way yet.
        if self.worm.contains(&new_head) {
            return Crashed(Collision::Body);
        }

        self.worm.push_head(new_head);

        let old_tail = if Some(new_head) == self.food {
            self.eaten += 1;
            self.food = place_food(&self.grid, self.worm.occupied(), rng);
            None
        } else {
            self.worm.pop_tail()
        };

        self.direction = self.pending_direction;
        Moved { new_head, old_head, old_tail }
    }
}
