//! Level export module for persisting the best evolved level and the settings
//! that produced it.
//!
//! The JSON export carries everything needed to rebuild the level (tile rows and
//! sprite placements) together with the run configuration, so a run can be
//! reproduced from its seed.

use crate::config::{GaConfig, LevelConfig};
use crate::evolution::Candidate;
use crate::evolution::fitness::ElementCounts;
use crate::level::{LevelError, LevelGrid, Sprite, tiles};
use crate::profile::PlayerProfile;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Complete export of an evolved level with run metadata.
#[derive(Serialize, Deserialize)]
pub struct LevelExport {
    /// Schema version for forward/backward compatibility
    pub schema_version: String,
    /// Unix timestamp when export was generated
    pub generated_at: u64,
    /// Snapshot of the configuration of the run
    pub run: RunConfig,
    /// Generations that had run when the level was exported
    pub generations: usize,
    pub fitness: f64,
    pub coins: u32,
    pub jumps: u32,
    pub enemies: u32,
    pub width: usize,
    pub height: usize,
    /// Tile codes, top row first
    pub tiles: Vec<Vec<u8>>,
    pub sprites: Vec<SpritePlacement>,
}

/// Subset of configuration relevant for reproducibility
#[derive(Serialize, Deserialize, Clone)]
pub struct RunConfig {
    pub ga: GaConfig,
    pub level: LevelConfig,
    pub profile: PlayerProfile,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SpritePlacement {
    pub x: usize,
    pub y: usize,
    pub sprite: Sprite,
}

impl LevelExport {
    /// Creates a new export from the best candidate of a run.
    ///
    /// # Arguments
    /// * `best` - The candidate to export, with an up-to-date fitness
    /// * `run` - Configuration of the run that produced it
    /// * `generations` - Number of generations the run went through
    pub fn new(best: &Candidate, run: RunConfig, generations: usize) -> Self {
        let ElementCounts {
            coins,
            jumps,
            enemies,
        } = best.counts();
        let grid = &best.grid;
        let sprites = (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
            .filter_map(|(x, y)| grid.sprite(x, y).map(|sprite| SpritePlacement { x, y, sprite }))
            .collect();

        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().timestamp() as u64,
            run,
            generations,
            fitness: best.fitness,
            coins,
            jumps,
            enemies,
            width: grid.width(),
            height: grid.height(),
            tiles: grid.tile_rows(),
            sprites,
        }
    }

    /// Rebuilds the exported level.
    ///
    /// # Returns
    /// * `Result<LevelGrid, LevelError>` - An error if the tile rows do not match
    ///   the declared size or a sprite lies outside the level
    pub fn to_grid(&self) -> Result<LevelGrid, LevelError> {
        let (width, height) = (self.width, self.height);
        let tiles: Vec<u8> = self.tiles.iter().flatten().copied().collect();
        if self.tiles.len() != height || self.tiles.iter().any(|row| row.len() != width) {
            let expected = width.saturating_mul(height);
            return Err(LevelError::ShapeMismatch {
                width,
                height,
                expected,
                tiles: tiles.len(),
                sprites: expected,
            });
        }

        let mut sprites = vec![None; tiles.len()];
        for placement in &self.sprites {
            let SpritePlacement { x, y, sprite } = *placement;
            if x >= width || y >= height {
                return Err(LevelError::SpriteOutOfBounds {
                    x,
                    y,
                    width,
                    height,
                });
            }
            sprites[y * width + x] = Some(sprite);
        }
        LevelGrid::from_parts(width, height, tiles, sprites)
    }
}

/// Writes a level export to a JSON file.
pub fn write_export_to_json(
    export: &LevelExport,
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(export)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

/// Reads a level export from a JSON file.
pub fn read_export_from_json(input_path: &Path) -> Result<LevelExport, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(input_path)?;
    let export: LevelExport = serde_json::from_str(&content)?;
    Ok(export)
}

/// One character per cell, enemies drawn over tiles. Meant for eyeballing a level
/// in a terminal.
pub fn render_ascii(grid: &LevelGrid) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let c = match grid.sprite(x, y) {
                Some(sprite) if sprite.is_enemy() => 'E',
                Some(_) => '*',
                None => tile_char(grid.tile(x, y)),
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}

fn tile_char(tile: u8) -> char {
    match tile {
        tiles::EMPTY => '.',
        tiles::COIN => 'o',
        tiles::TUBE_TOP_LEFT | tiles::TUBE_TOP_RIGHT => 'T',
        tiles::TUBE_SIDE_LEFT | tiles::TUBE_SIDE_RIGHT => '|',
        tiles::CANNON_TOP | tiles::CANNON_BODY => 'C',
        t if tiles::is_goal_marker(t) => 'G',
        tiles::GROUND
        | tiles::LEFT_GRASS_EDGE
        | tiles::RIGHT_GRASS_EDGE
        | tiles::LEFT_POCKET_GRASS
        | tiles::RIGHT_POCKET_GRASS => '#',
        tiles::GRASS | tiles::LEFT_UP_GRASS_EDGE | tiles::RIGHT_UP_GRASS_EDGE => '=',
        tiles::HILL_TOP_LEFT
        | tiles::HILL_TOP
        | tiles::HILL_TOP_RIGHT
        | tiles::HILL_TOP_LEFT_IN
        | tiles::HILL_TOP_RIGHT_IN => '^',
        tiles::HILL_LEFT | tiles::HILL_FILL | tiles::HILL_RIGHT => 'h',
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TruncationPolicy;
    use crate::level::LevelKind;
    use tempfile::NamedTempFile;

    fn create_test_run() -> RunConfig {
        RunConfig {
            ga: GaConfig {
                truncation: TruncationPolicy::Thinning,
                ..GaConfig::default()
            },
            level: LevelConfig {
                width: 6,
                height: 3,
                seed: 42,
                kind: LevelKind::Underground,
            },
            profile: PlayerProfile::new(5, 3, 2),
        }
    }

    fn create_test_candidate() -> Candidate {
        let mut grid = LevelGrid::new(6, 3).unwrap();
        for x in 0..6 {
            grid.set_tile(x, 2, tiles::GRASS);
        }
        grid.set_tile(2, 0, tiles::COIN);
        grid.set_sprite(4, 1, Some(Sprite::goomba()));
        let mut candidate = Candidate::new(grid);
        candidate.evaluate(&PlayerProfile::new(5, 3, 2));
        candidate
    }

    #[test]
    fn test_export_creation() {
        let candidate = create_test_candidate();
        let export = LevelExport::new(&candidate, create_test_run(), 12);

        assert_eq!(export.schema_version, "1.0.0");
        assert_eq!(export.generations, 12);
        assert_eq!((export.coins, export.jumps, export.enemies), (1, 1, 1));
        assert_eq!(export.tiles.len(), 3);
        assert_eq!(export.tiles[0][2], tiles::COIN);
        assert_eq!(
            export.sprites,
            vec![SpritePlacement {
                x: 4,
                y: 1,
                sprite: Sprite::goomba()
            }]
        );
        assert_eq!(export.to_grid().unwrap(), candidate.grid);
    }

    #[test]
    fn test_export_serialization() {
        let candidate = create_test_candidate();
        let export = LevelExport::new(&candidate, create_test_run(), 3);

        let temp_file = NamedTempFile::new().unwrap();
        write_export_to_json(&export, temp_file.path()).unwrap();

        let loaded = read_export_from_json(temp_file.path()).unwrap();
        assert_eq!(loaded.schema_version, export.schema_version);
        assert_eq!(loaded.fitness, export.fitness);
        assert_eq!(loaded.run.level.seed, 42);
        assert_eq!(loaded.run.ga.truncation, TruncationPolicy::Thinning);
        assert_eq!(loaded.to_grid().unwrap(), candidate.grid);
    }

    #[test]
    fn test_malformed_export_is_rejected() {
        let candidate = create_test_candidate();
        let export = LevelExport::new(&candidate, create_test_run(), 3);

        let mut short_rows = LevelExport::new(&candidate, create_test_run(), 3);
        short_rows.tiles = vec![vec![tiles::GRASS]];
        assert!(matches!(
            short_rows.to_grid(),
            Err(LevelError::ShapeMismatch { tiles: 1, .. })
        ));

        // right number of cells, but one row too long and one too short
        let mut ragged = LevelExport::new(&candidate, create_test_run(), 3);
        ragged.tiles[0].push(tiles::COIN);
        ragged.tiles[1].pop();
        assert!(matches!(ragged.to_grid(), Err(LevelError::ShapeMismatch { .. })));

        let mut stray_sprite = LevelExport::new(&candidate, create_test_run(), 3);
        stray_sprite.sprites.push(SpritePlacement {
            x: 6,
            y: 0,
            sprite: Sprite::goomba(),
        });
        assert_eq!(
            stray_sprite.to_grid(),
            Err(LevelError::SpriteOutOfBounds {
                x: 6,
                y: 0,
                width: 6,
                height: 3
            })
        );

        assert_eq!(export.to_grid().unwrap(), candidate.grid);
    }

    #[test]
    fn test_render_ascii() {
        let candidate = create_test_candidate();
        assert_eq!(render_ascii(&candidate.grid), "..o...\n....E.\n======\n");
    }
}
