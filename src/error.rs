use thiserror::Error;

use crate::GridInt;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("grid of {width}x{height} cells is too small, need at least {min_width}x{min_height}")]
    GridTooSmall {
        width: GridInt,
        height: GridInt,
        min_width: GridInt,
        min_height: GridInt,
    },

    #[error("terminal is {columns}x{rows}, the board needs at least {needed_columns}x{needed_rows}")]
    TerminalTooSmall {
        columns: u16,
        rows: u16,
        needed_columns: u16,
        needed_rows: u16,
    },

    #[error("terminal i/o failed")]
    Io(#[from] std::io::Error),
}
