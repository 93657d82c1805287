//! Seeded construction of starting levels.
//!
//! The genetic algorithm only needs *some* playable-looking levels to start from;
//! `LevelSource` is the seam through which a caller can plug its own level
//! constructor. `TerrainGenerator` is the built-in one.

use crate::level::terrain::{build_cannon, build_hill, build_pipe};
use crate::level::tiles;
use crate::level::{LevelError, LevelGrid, LevelKind, Sprite, SpriteKind};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Flat columns at the start of a level, where the player spawns.
pub const START_ZONE_WIDTH: usize = 8;
/// Flat columns at the end of a level. The goal lives here and nowhere else.
pub const GOAL_ZONE_WIDTH: usize = 10;

pub const MIN_WIDTH: usize = START_ZONE_WIDTH + GOAL_ZONE_WIDTH + 6;
pub const MIN_HEIGHT: usize = 8;

/// Produces starting levels for the population.
pub trait LevelSource: Sync {
    /// Builds a level of exactly `width` x `height` cells. The same seed must give
    /// the same level.
    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        kind: LevelKind,
    ) -> Result<LevelGrid, LevelError>;
}

/// Structure mix per level kind, as counts per 100 columns.
struct KindTuning {
    gap_chance: f64,
    hills: usize,
    pipes: usize,
    cannons: usize,
    coin_rows: usize,
    enemies: usize,
}

impl KindTuning {
    fn for_kind(kind: LevelKind) -> Self {
        match kind {
            LevelKind::Overground => Self {
                gap_chance: 0.25,
                hills: 3,
                pipes: 3,
                cannons: 0,
                coin_rows: 4,
                enemies: 4,
            },
            LevelKind::Underground => Self {
                gap_chance: 0.15,
                hills: 0,
                pipes: 4,
                cannons: 0,
                coin_rows: 8,
                enemies: 4,
            },
            LevelKind::Castle => Self {
                gap_chance: 0.35,
                hills: 0,
                pipes: 0,
                cannons: 3,
                coin_rows: 3,
                enemies: 5,
            },
        }
    }

    fn per_width(count: usize, width: usize) -> usize {
        count * width / 100
    }
}

/// Lays a ground line broken by gaps, plants the goal post in the goal zone and
/// decorates the rest with the structures of the requested kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerrainGenerator;

impl LevelSource for TerrainGenerator {
    fn generate(
        &self,
        width: usize,
        height: usize,
        seed: u64,
        kind: LevelKind,
    ) -> Result<LevelGrid, LevelError> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(LevelError::TooSmall {
                width,
                height,
                min_width: MIN_WIDTH,
                min_height: MIN_HEIGHT,
            });
        }
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut grid = LevelGrid::new(width, height)?;
        let tuning = KindTuning::for_kind(kind);
        let base = height - 2;

        lay_ground_line(&mut grid, base, tuning.gap_chance, &mut rng);
        place_goal(&mut grid, base);

        let middle = START_ZONE_WIDTH..width - GOAL_ZONE_WIDTH;
        for _ in 0..KindTuning::per_width(tuning.hills, width) {
            let x = rng.random_range(middle.clone());
            build_hill(&mut grid, x, 20, &mut rng);
        }
        for _ in 0..KindTuning::per_width(tuning.pipes, width) {
            let x = rng.random_range(middle.clone());
            if let Some(y) = grid.first_row_of(x, tiles::GRASS).filter(|&y| y > 0) {
                build_pipe(&mut grid, x, y - 1, &mut rng);
            }
        }
        for _ in 0..KindTuning::per_width(tuning.cannons, width) {
            let x = rng.random_range(middle.clone());
            if let Some(y) = grid.first_row_of(x, tiles::GRASS).filter(|&y| y > 0) {
                let cannon_height = rng.random_range(1..=2);
                build_cannon(&mut grid, x, y - 1, cannon_height);
            }
        }
        for _ in 0..KindTuning::per_width(tuning.coin_rows, width) {
            let x = rng.random_range(middle.clone());
            place_coin_row(&mut grid, x, rng.random_range(3..=6));
        }
        for _ in 0..KindTuning::per_width(tuning.enemies, width) {
            let x = rng.random_range(middle.clone());
            place_enemy(&mut grid, x, kind, &mut rng);
        }

        Ok(grid)
    }
}

/// Ground segments of varying height separated by short gaps. The start and
/// goal zones are always solid ground at the base height.
fn lay_ground_line<R: Rng>(grid: &mut LevelGrid, base: usize, gap_chance: f64, rng: &mut R) {
    let width = grid.width();
    let goal_zone = width - GOAL_ZONE_WIDTH;
    let mut x = 0;
    let mut after_gap = true;

    while x < width {
        if x > 0 && !after_gap && x < goal_zone && rng.random_bool(gap_chance) {
            // a gap never reaches into the goal zone
            x += rng.random_range(2..=3).min(goal_zone - x);
            after_gap = true;
            continue;
        }
        after_gap = false;

        let mut len = if x == 0 {
            START_ZONE_WIDTH
        } else {
            rng.random_range(4..=12)
        };
        if x + len >= goal_zone {
            len = width - x;
        }
        let top = if x == 0 || x + len == width {
            base
        } else {
            rng.random_range(base - 3..=base)
        };
        lay_segment(grid, x, len, top);
        x += len;
    }
}

fn lay_segment(grid: &mut LevelGrid, start: usize, len: usize, top: usize) {
    let end = start + len - 1;
    for x in start..=end {
        // level borders have no visible edge
        let left = x == start && x != 0;
        let right = x == end && x != grid.width() - 1;
        for y in top..grid.height() {
            let tile = match (y == top, left, right) {
                (true, true, _) => tiles::LEFT_UP_GRASS_EDGE,
                (true, _, true) => tiles::RIGHT_UP_GRASS_EDGE,
                (true, _, _) => tiles::GRASS,
                (false, true, _) => tiles::LEFT_GRASS_EDGE,
                (false, _, true) => tiles::RIGHT_GRASS_EDGE,
                (false, _, _) => tiles::GROUND,
            };
            grid.set_tile(x, y, tile);
        }
    }
}

/// A horizontal row of coins three rows above the surface found at column `x`.
fn place_coin_row(grid: &mut LevelGrid, x: usize, len: usize) {
    let Some(surface) = surface_row(grid, x) else {
        return;
    };
    let Some(y) = surface.checked_sub(3) else {
        return;
    };
    for xx in x..x + len {
        if grid.is_empty(xx, y) {
            grid.set_tile(xx, y, tiles::COIN);
        }
    }
}

fn place_enemy<R: Rng>(grid: &mut LevelGrid, x: usize, kind: LevelKind, rng: &mut R) {
    let Some(y) = surface_row(grid, x).and_then(|s| s.checked_sub(1)) else {
        return;
    };
    if !grid.is_empty(x, y) || grid.sprite(x, y).is_some() {
        return;
    }
    let kinds: &[SpriteKind] = match kind {
        LevelKind::Castle => &[SpriteKind::Goomba, SpriteKind::RedKoopa, SpriteKind::Spiky],
        _ => &[SpriteKind::Goomba, SpriteKind::Goomba, SpriteKind::GreenKoopa, SpriteKind::RedKoopa],
    };
    let sprite_kind = kinds[rng.random_range(0..kinds.len())];
    grid.set_sprite(x, y, Some(Sprite::new(sprite_kind, rng.random_ratio(1, 8))));
}

/// Topmost occupied row of column `x`, if the column is not a gap.
fn surface_row(grid: &LevelGrid, x: usize) -> Option<usize> {
    (0..grid.height()).find(|&y| !grid.is_empty(x, y))
}

/// Two posts joined by a bar, standing on the base ground line near the end.
fn place_goal(grid: &mut LevelGrid, base: usize) {
    let x = grid.width() - GOAL_ZONE_WIDTH / 2 - 1;
    let post_height = (base - 1).min(5);
    let top = base - post_height;
    grid.set_tile(x, top, tiles::BLUE_GOAL_TOP);
    grid.set_tile(x + 2, top, tiles::PURPLE_GOAL_TOP);
    for y in top + 1..base {
        grid.set_tile(x, y, tiles::BLUE_GOAL);
        grid.set_tile(x + 2, y, tiles::PURPLE_GOAL);
    }
    grid.set_tile(x + 1, top + 1, tiles::GOAL_BAR);
    grid.set_tile(x + 1, top + 2, tiles::GOAL_BAR_END);
}
