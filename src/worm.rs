use std::collections::{HashSet, VecDeque};

use crate::grid::Grid;
use crate::{Cell, GridInt};
use Direction::*;

pub const INITIAL_WORM_LENGTH: GridInt = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// Unit step as `(d_row, d_col)`.
    pub fn vector(self) -> (GridInt, GridInt) {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn step(self, (row, col): Cell) -> Cell {
        let (dr, dc) = self.vector();
        (row + dr, col + dc)
    }

    pub fn head_char(self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// Cells tail first, head last. `occupied` mirrors `body` so membership
/// checks don't walk the whole worm.
#[derive(Clone, Debug)]
pub struct Worm {
    body: VecDeque<Cell>,
    occupied: HashSet<Cell>,
}

impl Worm {
    fn empty() -> Self {
        Worm { body: VecDeque::new(), occupied: HashSet::new() }
    }

    /// A horizontal worm on the middle row, heading right. Always at least
    /// one cell long.
    pub fn centered(grid: &Grid, length: GridInt) -> Self {
        let length = length.max(1);
        let (row, center_col) = grid.center();
        let start_col = (center_col - length / 2).max(1);

        let mut worm = Worm::empty();
        for i in 0..length {
            worm.push_head((row, start_col + i));
        }
        worm
    }

    /// Builds a worm from cells listed tail first. Duplicates are dropped.
    /// `None` when there are no cells at all.
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Option<Self> {
        let mut worm = Worm::empty();
        for cell in cells {
            worm.push_head(cell);
        }
        if worm.is_empty() {
            return None;
        }
        Some(worm)
    }

    pub fn head(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn tail(&self) -> Cell {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.occupied.contains(cell)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.body.iter()
    }

    pub fn occupied(&self) -> &HashSet<Cell> {
        &self.occupied
    }

    pub(crate) fn push_head(&mut self, cell: Cell) {
        if self.occupied.insert(cell) {
            self.body.push_back(cell);
        }
    }

    pub(crate) fn pop_tail(&mut self) -> Option<Cell> {
        let old_tail = self.body.pop_front()?;
        self.occupied.remove(&old_tail);
        Some(old_tail)
    }
}
