use crate::level::terrain::{build_hill, build_pipe, remove_pipe};
use crate::level::{LevelGrid, Sprite, tiles};
use log::debug;
use rand::Rng;

/// Draws of a random cell when looking for an empty one.
pub const FREE_CELL_ATTEMPTS: usize = 1000;
/// Random cells tried when looking for a spot to grow a pipe.
pub const PIPE_ATTEMPTS: usize = 100;
/// Longest footprint of a hill grown by mutation.
const HILL_MAX_LENGTH: usize = 20;

/// The eight edits a mutation can make, drawn with equal probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    AddCoin,
    RemoveCoin,
    AddEnemy,
    RemoveEnemy,
    AddHill,
    RemoveHill,
    AddPipe,
    RemovePipe,
}

impl MutationKind {
    pub const ALL: [MutationKind; 8] = [
        MutationKind::AddCoin,
        MutationKind::RemoveCoin,
        MutationKind::AddEnemy,
        MutationKind::RemoveEnemy,
        MutationKind::AddHill,
        MutationKind::RemoveHill,
        MutationKind::AddPipe,
        MutationKind::RemovePipe,
    ];
}

/// Applies one uniformly drawn edit to the level.
///
/// # Returns
/// * `MutationKind` - The edit that was drawn, whether or not it changed anything
pub fn mutate<R: Rng>(grid: &mut LevelGrid, rng: &mut R) -> MutationKind {
    let kind = MutationKind::ALL[rng.random_range(0..MutationKind::ALL.len())];
    apply(grid, kind, rng);
    kind
}

/// Applies a specific edit. Edits without a valid target leave the level as is.
pub fn apply<R: Rng>(grid: &mut LevelGrid, kind: MutationKind, rng: &mut R) {
    match kind {
        MutationKind::AddCoin => add_coin(grid, rng),
        MutationKind::RemoveCoin => remove_random_coin(grid, rng),
        MutationKind::AddEnemy => add_enemy(grid, rng),
        MutationKind::RemoveEnemy => remove_random_enemy(grid, rng),
        MutationKind::AddHill => {
            if rng.random_ratio(1, 20) {
                let x = rng.random_range(0..grid.width());
                build_hill(grid, x, HILL_MAX_LENGTH, rng);
            }
        }
        // hills are left alone; a level may not have any to begin with
        MutationKind::RemoveHill => {}
        MutationKind::AddPipe => add_pipe(grid, rng),
        MutationKind::RemovePipe => {
            remove_pipe(grid, rng);
        }
    }
}

fn add_coin<R: Rng>(grid: &mut LevelGrid, rng: &mut R) {
    let Some((x, y)) = random_empty_cell(grid, rng) else {
        debug!("No empty cell found for a coin");
        return;
    };
    let y = resting_row(grid, x, y, 5, rng);
    grid.set_tile(x, y, tiles::COIN);
}

fn add_enemy<R: Rng>(grid: &mut LevelGrid, rng: &mut R) {
    let x = rng.random_range(0..grid.width());
    let y = rng.random_range(0..grid.height());
    if grid.is_empty(x, y) {
        let y = resting_row(grid, x, y, 3, rng);
        grid.set_sprite(x, y, Some(Sprite::goomba()));
    }
}

fn add_pipe<R: Rng>(grid: &mut LevelGrid, rng: &mut R) {
    for _ in 0..PIPE_ATTEMPTS {
        let x = rng.random_range(0..grid.width());
        let y = rng.random_range(0..grid.height());
        if y > 0 && grid.tile(x, y) == tiles::GRASS && build_pipe(grid, x, y - 1, rng) {
            return;
        }
    }
}

fn remove_random_coin<R: Rng>(grid: &mut LevelGrid, rng: &mut R) {
    let coins = grid.positions_of(tiles::COIN);
    if coins.is_empty() {
        return;
    }
    let (x, y) = coins[rng.random_range(0..coins.len())];
    grid.set_tile(x, y, tiles::EMPTY);
}

fn remove_random_enemy<R: Rng>(grid: &mut LevelGrid, rng: &mut R) {
    let enemies = grid.enemy_positions();
    if enemies.is_empty() {
        return;
    }
    let (x, y) = enemies[rng.random_range(0..enemies.len())];
    grid.set_sprite(x, y, None);
}

fn random_empty_cell<R: Rng>(grid: &LevelGrid, rng: &mut R) -> Option<(usize, usize)> {
    (0..FREE_CELL_ATTEMPTS)
        .map(|_| {
            (
                rng.random_range(0..grid.width()),
                rng.random_range(0..grid.height()),
            )
        })
        .find(|&(x, y)| grid.is_empty(x, y))
}

/// Row for an item dropped into column `x` from the empty cell `(x, y)`: the
/// item falls onto whatever is below and is then raised by a random `0..range`
/// rows. A raise that would end inside terrain is dropped.
fn resting_row<R: Rng>(grid: &LevelGrid, x: usize, y: usize, range: usize, rng: &mut R) -> usize {
    let mut floor = y;
    while floor + 1 < grid.height() && grid.is_empty(x, floor + 1) {
        floor += 1;
    }
    let raised = floor.saturating_sub(rng.random_range(0..range));
    if grid.is_empty(x, raised) { raised } else { floor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::fitness::count_elements;
    use crate::level::generator::{LevelSource, TerrainGenerator};
    use crate::level::LevelKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn flat_level() -> LevelGrid {
        let mut grid = LevelGrid::new(40, 12).unwrap();
        for x in 0..40 {
            grid.set_tile(x, 10, tiles::GRASS);
            grid.set_tile(x, 11, tiles::GROUND);
        }
        grid
    }

    #[test]
    fn test_add_coin_rests_above_ground() {
        let mut rng = Pcg64::seed_from_u64(1);
        for _ in 0..50 {
            let mut grid = flat_level();
            apply(&mut grid, MutationKind::AddCoin, &mut rng);
            let coins = grid.positions_of(tiles::COIN);
            assert_eq!(coins.len(), 1);
            let (_, y) = coins[0];
            assert!((5..=9).contains(&y), "coin at row {}", y);
        }
    }

    #[test]
    fn test_remove_coin_without_coins_is_noop() {
        let mut grid = flat_level();
        let before = grid.clone();
        let mut rng = Pcg64::seed_from_u64(2);
        apply(&mut grid, MutationKind::RemoveCoin, &mut rng);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_remove_coin_clears_one() {
        let mut grid = flat_level();
        grid.set_tile(3, 4, tiles::COIN);
        grid.set_tile(9, 6, tiles::COIN);
        let mut rng = Pcg64::seed_from_u64(3);
        apply(&mut grid, MutationKind::RemoveCoin, &mut rng);
        assert_eq!(grid.positions_of(tiles::COIN).len(), 1);
    }

    #[test]
    fn test_enemy_round_trip() {
        let mut grid = flat_level();
        let mut rng = Pcg64::seed_from_u64(4);
        // the drawn cell is empty most of the time, so a few tries are enough
        for _ in 0..20 {
            apply(&mut grid, MutationKind::AddEnemy, &mut rng);
        }
        let placed = grid.enemy_positions();
        assert!(!placed.is_empty());
        assert!(placed.iter().all(|&(_, y)| (7..=9).contains(&y)));

        for _ in 0..placed.len() {
            apply(&mut grid, MutationKind::RemoveEnemy, &mut rng);
        }
        assert!(grid.enemy_positions().is_empty());
        apply(&mut grid, MutationKind::RemoveEnemy, &mut rng);
        assert_eq!(grid, flat_level());
    }

    #[test]
    fn test_remove_hill_is_noop() {
        let mut grid = TerrainGenerator.generate(80, 15, 5, LevelKind::Overground).unwrap();
        let before = grid.clone();
        let mut rng = Pcg64::seed_from_u64(5);
        apply(&mut grid, MutationKind::RemoveHill, &mut rng);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_add_pipe_on_grass() {
        let mut grid = flat_level();
        let mut rng = Pcg64::seed_from_u64(6);
        apply(&mut grid, MutationKind::AddPipe, &mut rng);
        // grass cells are a twelfth of the grid, so 100 draws find one
        assert_eq!(grid.positions_of(tiles::TUBE_TOP_LEFT).len(), 1);
        assert_eq!(count_elements(&grid).jumps, 1);

        apply(&mut grid, MutationKind::RemovePipe, &mut rng);
        assert_eq!(grid, flat_level());
    }

    #[test]
    fn test_mutate_keeps_dimensions() {
        let mut grid = TerrainGenerator.generate(100, 15, 6, LevelKind::Underground).unwrap();
        let mut rng = Pcg64::seed_from_u64(7);
        let mut seen = Vec::new();
        for _ in 0..200 {
            let kind = mutate(&mut grid, &mut rng);
            if !seen.contains(&kind) {
                seen.push(kind);
            }
            assert_eq!(grid.width(), 100);
            assert_eq!(grid.height(), 15);
        }
        assert_eq!(seen.len(), MutationKind::ALL.len());
    }
}
