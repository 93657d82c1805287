pub mod generator;
pub mod terrain;
pub mod tiles;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum LevelError {
    #[error("Level dimensions must be non-zero (got {width}x{height})")]
    ZeroDimensions { width: usize, height: usize },
    #[error(
        "Tile matrix has {tiles} cells and sprite matrix has {sprites} cells, expected {expected} for {width}x{height}"
    )]
    ShapeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        tiles: usize,
        sprites: usize,
    },
    #[error("Sprite at ({x}, {y}) lies outside the {width}x{height} level")]
    SpriteOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("Level of {width}x{height} is too small, need at least {min_width}x{min_height}")]
    TooSmall {
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },
}

/// The visual theme a level is generated for. It only changes the mix of
/// structures the generator lays down.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    #[default]
    Overground,
    Underground,
    Castle,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpriteKind {
    Goomba,
    RedKoopa,
    GreenKoopa,
    Spiky,
    PowerUp,
}

/// A sprite placed on a grid cell.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub winged: bool,
}

impl Sprite {
    pub fn new(kind: SpriteKind, winged: bool) -> Self {
        Self { kind, winged }
    }

    pub fn goomba() -> Self {
        Self::new(SpriteKind::Goomba, false)
    }

    /// Anything hostile to the player counts as an enemy, so the kill target
    /// covers Koopas and Spikies as well as Goombas.
    pub fn is_enemy(&self) -> bool {
        self.kind != SpriteKind::PowerUp
    }
}

/// A level: a matrix of tile codes plus a parallel matrix of optional sprites.
///
/// Cells are addressed `(x, y)` with `x` growing to the right and `y` growing
/// downwards. Reads outside the grid yield an empty cell and writes outside the
/// grid are dropped, so structure builders can probe neighbours freely.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGrid {
    width: usize,
    height: usize,
    /// Row-major tile codes
    tiles: Vec<u8>,
    /// Row-major sprite placements
    sprites: Vec<Option<Sprite>>,
}

impl LevelGrid {
    /// Creates an empty level of the given size.
    pub fn new(width: usize, height: usize) -> Result<Self, LevelError> {
        if width == 0 || height == 0 {
            return Err(LevelError::ZeroDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            tiles: vec![tiles::EMPTY; width * height],
            sprites: vec![None; width * height],
        })
    }

    /// Assembles a level from externally produced matrices, rejecting matrices
    /// whose shapes disagree with the declared size or with each other.
    pub fn from_parts(
        width: usize,
        height: usize,
        tiles: Vec<u8>,
        sprites: Vec<Option<Sprite>>,
    ) -> Result<Self, LevelError> {
        if width == 0 || height == 0 {
            return Err(LevelError::ZeroDimensions { width, height });
        }
        let expected = width * height;
        if tiles.len() != expected || sprites.len() != expected {
            return Err(LevelError::ShapeMismatch {
                width,
                height,
                expected,
                tiles: tiles.len(),
                sprites: sprites.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
            sprites,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    pub fn tile(&self, x: usize, y: usize) -> u8 {
        self.index(x, y).map_or(tiles::EMPTY, |i| self.tiles[i])
    }

    pub fn set_tile(&mut self, x: usize, y: usize, tile: u8) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    pub fn is_empty(&self, x: usize, y: usize) -> bool {
        self.tile(x, y) == tiles::EMPTY
    }

    pub fn sprite(&self, x: usize, y: usize) -> Option<Sprite> {
        self.index(x, y).and_then(|i| self.sprites[i])
    }

    pub fn set_sprite(&mut self, x: usize, y: usize, sprite: Option<Sprite>) {
        if let Some(i) = self.index(x, y) {
            self.sprites[i] = sprite;
        }
    }

    /// Coordinates of every cell holding `tile`, scanned column by column.
    pub fn positions_of(&self, tile: u8) -> Vec<(usize, usize)> {
        (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| (x, y)))
            .filter(|&(x, y)| self.tile(x, y) == tile)
            .collect()
    }

    /// Coordinates of every enemy sprite, scanned column by column.
    pub fn enemy_positions(&self) -> Vec<(usize, usize)> {
        (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| (x, y)))
            .filter(|&(x, y)| self.sprite(x, y).is_some_and(|s| s.is_enemy()))
            .collect()
    }

    /// First row of column `x` holding `tile`, scanning from the top.
    pub fn first_row_of(&self, x: usize, tile: u8) -> Option<usize> {
        (0..self.height).find(|&y| self.tile(x, y) == tile)
    }

    /// Tile rows top to bottom, for export.
    pub fn tile_rows(&self) -> Vec<Vec<u8>> {
        self.tiles.chunks(self.width).map(<[u8]>::to_vec).collect()
    }
}
