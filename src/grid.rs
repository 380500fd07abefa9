use crate::{Cell, GameError, GridInt};

pub const MIN_WIDTH: GridInt = 10;
pub const MIN_HEIGHT: GridInt = 6;

pub const DEFAULT_WIDTH: GridInt = 48;
pub const DEFAULT_HEIGHT: GridInt = 32;

/// Board dimensions in cells. Row 0 is the top, column 0 the left edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    height: GridInt,
    width: GridInt,
}

impl Grid {
    pub fn new(height: GridInt, width: GridInt) -> Result<Self, GameError> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(GameError::GridTooSmall {
                width,
                height,
                min_width: MIN_WIDTH,
                min_height: MIN_HEIGHT,
            });
        }

        Ok(Grid { height, width })
    }

    pub fn height(&self) -> GridInt {
        self.height
    }

    pub fn width(&self) -> GridInt {
        self.width
    }

    pub fn contains(&self, (row, col): Cell) -> bool {
        (0..self.height).contains(&row) && (0..self.width).contains(&col)
    }

    /// Cells off the one-cell border, row by row.
    pub fn interior(&self) -> impl Iterator<Item = Cell> {
        let (height, width) = (self.height, self.width);
        (1..height - 1).flat_map(move |row| (1..width - 1).map(move |col| (row, col)))
    }

    pub fn center(&self) -> Cell {
        (self.height / 2, self.width / 2)
    }
}
