use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::Grid;
use crate::Cell;

/// Picks a free interior cell uniformly at random. `None` means the board is
/// full.
pub fn place_food<R: Rng + ?Sized>(grid: &Grid, occupied: &HashSet<Cell>, rng: &mut R) -> Option<Cell> {
    let choices: Vec<Cell> = grid.interior().filter(|pos| !occupied.contains(pos)).collect();
    choices.choose(rng).copied()
}
