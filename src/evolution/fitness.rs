//! Scores a level against a player profile.
//!
//! Each of the three gameplay counts is turned into a ratio against its target and
//! reshaped so that a small overshoot still scores as a perfect match, a larger
//! overshoot decays, and a gross overshoot is punished with -1. Undershoot is
//! penalized linearly. The fitness is the mean of the three reshaped ratios.

use crate::level::{LevelGrid, tiles};
use crate::profile::PlayerProfile;
use serde::Serialize;

/// Gameplay-relevant element counts of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ElementCounts {
    pub coins: u32,
    /// Jump-requiring tiles plus one per enemy, since enemies have to be jumped over
    pub jumps: u32,
    pub enemies: u32,
}

/// Reshaping bounds `(mid, upper)` per objective.
const COIN_BOUNDS: (f64, f64) = (1.5, 2.0);
const JUMP_BOUNDS: (f64, f64) = (1.5, 2.0);
const KILL_BOUNDS: (f64, f64) = (2.0, 3.0);

/// Counts coins, jumps and enemies in a single pass over the grid.
pub fn count_elements(grid: &LevelGrid) -> ElementCounts {
    let mut counts = ElementCounts::default();
    for x in 0..grid.width() {
        for y in 0..grid.height() {
            let tile = grid.tile(x, y);
            if tile == tiles::COIN {
                counts.coins += 1;
            }
            if tiles::requires_jump(tile) {
                counts.jumps += 1;
            }
            if grid.sprite(x, y).is_some_and(|s| s.is_enemy()) {
                counts.enemies += 1;
                counts.jumps += 1;
            }
        }
    }
    counts
}

/// Fitness of a level for the given profile. Always finite, in `[-1, 1]`.
pub fn evaluate(grid: &LevelGrid, profile: &PlayerProfile) -> f64 {
    score(&count_elements(grid), profile)
}

/// Fitness from already computed counts.
pub fn score(counts: &ElementCounts, profile: &PlayerProfile) -> f64 {
    let coin_fit = reshape(ratio(counts.coins, profile.coins), COIN_BOUNDS);
    let jump_fit = reshape(ratio(counts.jumps, profile.jumps), JUMP_BOUNDS);
    let kill_fit = reshape(ratio(counts.enemies, profile.kills), KILL_BOUNDS);

    let fitness = (coin_fit + jump_fit + kill_fit) / 3.0;
    if fitness.is_finite() { fitness } else { 0.0 }
}

/// `count / target`, with NaN standing for "no target set".
fn ratio(count: u32, target: u32) -> f64 {
    if target == 0 {
        f64::NAN
    } else {
        f64::from(count) / f64::from(target)
    }
}

fn reshape(ratio: f64, (mid, upper): (f64, f64)) -> f64 {
    if ratio.is_nan() {
        0.0
    } else if ratio > upper {
        -1.0
    } else if ratio > mid {
        1.0 / (2.0 * ratio)
    } else if ratio > 1.0 {
        1.0
    } else {
        ratio
    }
}
