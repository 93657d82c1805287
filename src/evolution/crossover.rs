//! Single-point crossover over level columns.
//!
//! The child is parent A up to a cut column and parent B from there on. The cut
//! is only made through columns that hold no fragile structure in either parent,
//! and the seam is patched so that ground edges stay visually closed.

use crate::level::LevelGrid;
use crate::level::tiles::{self, EMPTY};
use log::{debug, warn};
use rand::Rng;

/// Draws of the cut column before the last drawn column is accepted as is.
pub const SPLIT_ATTEMPTS: usize = 100;

/// Builds a child level from two parents. Both parents are left untouched.
///
/// # Arguments
/// * `base` - Parent providing the columns left of the cut
/// * `donor` - Parent providing the columns from the cut to the right edge
///
/// # Returns
/// * `LevelGrid` - A new level with the parents' dimensions
pub fn crossover<R: Rng>(base: &LevelGrid, donor: &LevelGrid, rng: &mut R) -> LevelGrid {
    if base.width() != donor.width() || base.height() != donor.height() {
        warn!(
            "crossover received parents of different sizes ({}x{} vs {}x{})",
            base.width(),
            base.height(),
            donor.width(),
            donor.height()
        );
        // NoOp
        return base.clone();
    }

    let width = base.width();
    let split = find_split_column(base, donor, rng);
    let mut child = base.clone();

    for x in split..width {
        for y in 0..base.height() {
            child.set_sprite(x, y, donor.sprite(x, y));

            let block = donor.tile(x, y);
            if tiles::is_goal_marker(block) {
                child.set_tile(x, y, EMPTY);
                continue;
            }
            // the outermost columns have no neighbour to patch against
            if x == 0 || x == width - 1 {
                continue;
            }
            let tile = seam_tile(&child, donor, x, y);
            child.set_tile(x, y, tile);
        }
    }
    child
}

/// Picks the cut column, preferring one without fragile tiles in either parent.
fn find_split_column<R: Rng>(a: &LevelGrid, b: &LevelGrid, rng: &mut R) -> usize {
    let is_clean = |x: usize| is_clean_column(a, x) && is_clean_column(b, x);
    let mut split = rng.random_range(0..a.width());
    let mut draws = 1;
    while !is_clean(split) {
        if draws == SPLIT_ATTEMPTS {
            debug!(
                "No clean cut column after {} draws, cutting at column {}",
                SPLIT_ATTEMPTS, split
            );
            break;
        }
        split = rng.random_range(0..a.width());
        draws += 1;
    }
    split
}

fn is_clean_column(grid: &LevelGrid, x: usize) -> bool {
    (0..grid.height()).all(|y| !tiles::is_fragile(grid.tile(x, y)))
}

/// The tile to write at `(x, y)` when copying the donor cell next to the
/// already assembled column `x - 1` of the child.
fn seam_tile(child: &LevelGrid, donor: &LevelGrid, x: usize, y: usize) -> u8 {
    let block = donor.tile(x, y);
    let right_open = donor.is_empty(x + 1, y);
    let left_open = child.is_empty(x - 1, y);
    let above_open = y == 0 || donor.is_empty(x, y - 1);

    if right_open && left_open {
        EMPTY
    } else if matches!(
        block,
        tiles::GROUND | tiles::LEFT_POCKET_GRASS | tiles::RIGHT_POCKET_GRASS
    ) && above_open
    {
        tiles::GRASS
    } else if right_open {
        match block {
            tiles::GROUND => tiles::RIGHT_GRASS_EDGE,
            tiles::GRASS => tiles::RIGHT_UP_GRASS_EDGE,
            _ => block,
        }
    } else if left_open {
        match block {
            tiles::GROUND => tiles::LEFT_GRASS_EDGE,
            tiles::GRASS => tiles::LEFT_UP_GRASS_EDGE,
            _ => block,
        }
    } else {
        block
    }
}
