//! A worm game: the worm crawls across a bounded grid, eats food to grow and
//! clears levels that get faster as it goes.
//!
//! The game logic lives in [`state`] and [`game`]; [`term`] and `window`
//! are the two ways of putting it on screen.

pub mod config;
pub mod error;
pub mod food;
pub mod game;
pub mod grid;
pub mod level;
pub mod state;
pub mod term;
pub mod worm;

#[cfg(feature = "window")]
pub mod window;

pub use error::GameError;

pub type GridInt = i16;

/// A grid position as `(row, column)`.
pub type Cell = (GridInt, GridInt);
