//! Builders for multi-cell terrain structures: stepped hills, pipes and cannons.
//!
//! The builders only ever write onto empty cells (hills may also turn an existing
//! top corner into its inner-corner variant), so they never cut through terrain
//! that is already there.

use crate::level::LevelGrid;
use crate::level::tiles::{self, sheet};
use log::debug;
use rand::Rng;

/// How many locations the hill builder tries before giving up.
pub const HILL_ATTEMPTS: usize = 100;

/// Rows cleared below a pipe top when a pipe is removed.
const PIPE_CLEAR_DEPTH: usize = 6;

/// Builds a layered hill whose footprint starts at column `x0`.
///
/// The footprint (10 to 19 columns, capped at `max_length`) must sit on flat
/// grass. When it doesn't, a new random column is tried, up to `HILL_ATTEMPTS`
/// relocations.
///
/// # Returns
/// * `bool` - `true` if a hill was raised, `false` if no flat footprint was found
pub fn build_hill<R: Rng>(grid: &mut LevelGrid, x0: usize, max_length: usize, rng: &mut R) -> bool {
    let mut xo = x0;
    for _ in 0..=HILL_ATTEMPTS {
        let length = rng.random_range(10..20).min(max_length);
        if let Some(ground) = flat_grass_row(grid, xo, length) {
            raise_hill(grid, xo, length, ground, rng);
            return true;
        }
        xo = rng.random_range(0..grid.width());
    }
    debug!("No flat ground for a hill after {} attempts", HILL_ATTEMPTS);
    false
}

/// The grass row under column `xo`, provided every column of the footprint has
/// grass on that same row.
fn flat_grass_row(grid: &LevelGrid, xo: usize, length: usize) -> Option<usize> {
    let ground = grid.first_row_of(xo, tiles::GRASS)?;
    (xo..xo + length)
        .all(|x| grid.tile(x, ground) == tiles::GRASS)
        .then_some(ground)
}

/// Stacks layers of decreasing footprint from the ground row upwards.
fn raise_hill<R: Rng>(grid: &mut LevelGrid, xo: usize, length: usize, ground: usize, rng: &mut R) {
    // edges of every layer placed so far, relative to xo
    let mut occupied = vec![false; length];
    let mut top = ground;

    loop {
        top = match top.checked_sub(rng.random_range(2..=4)) {
            Some(row) if row > 0 => row,
            _ => break,
        };

        let l = rng.random_range(3..=7);
        if length < l + 3 {
            break;
        }
        let offset = rng.random_range(0..length - l - 2) + 1;
        if !edges_free(&occupied, offset, l) {
            break;
        }
        occupied[offset] = true;
        occupied[offset + l] = true;
        let last_layer = rng.random_ratio(1, 4);

        let start = xo + offset;
        for x in start..start + l {
            for y in top..ground {
                let column = if x == start {
                    4
                } else if x == start + l - 1 {
                    6
                } else {
                    5
                };
                let row = if y == top { 8 } else { 9 };

                match grid.tile(x, y) {
                    tiles::EMPTY => grid.set_tile(x, y, sheet(column, row)),
                    tiles::HILL_TOP_LEFT => grid.set_tile(x, y, tiles::HILL_TOP_LEFT_IN),
                    tiles::HILL_TOP_RIGHT => grid.set_tile(x, y, tiles::HILL_TOP_RIGHT_IN),
                    _ => {}
                }
            }
        }

        if last_layer {
            break;
        }
    }
}

/// A layer spanning `offset..offset + l` may not put its edges on, or right next
/// to, the edge of a layer below it.
fn edges_free(occupied: &[bool], offset: usize, l: usize) -> bool {
    ![offset - 1, offset, offset + l, offset + l + 1]
        .iter()
        .any(|&i| occupied[i])
}

/// Builds a 2-wide pipe of random height (2 to 4) standing on row `y + 1`, so
/// its lowest row is `y`.
///
/// # Returns
/// * `bool` - `false` without touching the grid if any cell of the footprint is
///   occupied or lies outside the grid
pub fn build_pipe<R: Rng>(grid: &mut LevelGrid, x: usize, y: usize, rng: &mut R) -> bool {
    let pipe_height = rng.random_range(2..=4);
    if y + 1 < pipe_height || x + 1 >= grid.width() || y >= grid.height() {
        return false;
    }
    let top = y + 1 - pipe_height;

    let clear = (top..=y).all(|yy| grid.is_empty(x, yy) && grid.is_empty(x + 1, yy));
    if !clear {
        return false;
    }

    for yy in top + 1..=y {
        grid.set_tile(x, yy, tiles::TUBE_SIDE_LEFT);
        grid.set_tile(x + 1, yy, tiles::TUBE_SIDE_RIGHT);
    }
    grid.set_tile(x, top, tiles::TUBE_TOP_LEFT);
    grid.set_tile(x + 1, top, tiles::TUBE_TOP_RIGHT);
    true
}

/// Removes a random pipe by clearing a 2x6 region from its top down, leaving
/// ground and grass tiles in place.
///
/// # Returns
/// * `bool` - `false` if the level has no pipe
pub fn remove_pipe<R: Rng>(grid: &mut LevelGrid, rng: &mut R) -> bool {
    let tops = grid.positions_of(tiles::TUBE_TOP_LEFT);
    if tops.is_empty() {
        return false;
    }
    let (x, y) = tops[rng.random_range(0..tops.len())];

    for yy in y..y + PIPE_CLEAR_DEPTH {
        for xx in x..=x + 1 {
            if !tiles::is_ground_line(grid.tile(xx, yy)) {
                grid.set_tile(xx, yy, tiles::EMPTY);
            }
        }
    }
    true
}

/// Builds a one-wide cannon of `height` cells whose base sits on row `y`.
pub fn build_cannon(grid: &mut LevelGrid, x: usize, y: usize, height: usize) -> bool {
    if height == 0 || y + 1 < height || y >= grid.height() {
        return false;
    }
    let top = y + 1 - height;
    if !(top..=y).all(|yy| grid.is_empty(x, yy)) {
        return false;
    }
    grid.set_tile(x, top, tiles::CANNON_TOP);
    for yy in top + 1..=y {
        grid.set_tile(x, yy, tiles::CANNON_BODY);
    }
    true
}
