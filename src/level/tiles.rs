//! Tile codes of the level sprite sheet.
//!
//! Every code is the sheet position `column + row * 16`, so a tile's variant can be
//! derived arithmetically (the hill builder relies on this).

/// Builds a tile code from its sheet coordinates.
pub const fn sheet(column: u8, row: u8) -> u8 {
    column + row * 16
}

pub const EMPTY: u8 = 0;

pub const GROUND: u8 = sheet(1, 9);
pub const GRASS: u8 = sheet(1, 8);
pub const LEFT_GRASS_EDGE: u8 = sheet(0, 9);
pub const RIGHT_GRASS_EDGE: u8 = sheet(2, 9);
pub const LEFT_UP_GRASS_EDGE: u8 = sheet(0, 8);
pub const RIGHT_UP_GRASS_EDGE: u8 = sheet(2, 8);
pub const LEFT_POCKET_GRASS: u8 = sheet(3, 9);
pub const RIGHT_POCKET_GRASS: u8 = sheet(3, 8);

pub const COIN: u8 = sheet(2, 2);

pub const HILL_TOP_LEFT: u8 = sheet(4, 8);
pub const HILL_TOP: u8 = sheet(5, 8);
pub const HILL_TOP_RIGHT: u8 = sheet(6, 8);
pub const HILL_LEFT: u8 = sheet(4, 9);
pub const HILL_FILL: u8 = sheet(5, 9);
pub const HILL_RIGHT: u8 = sheet(6, 9);
pub const HILL_TOP_LEFT_IN: u8 = sheet(4, 11);
pub const HILL_TOP_RIGHT_IN: u8 = sheet(6, 11);

pub const TUBE_TOP_LEFT: u8 = sheet(10, 0);
pub const TUBE_TOP_RIGHT: u8 = sheet(11, 0);
pub const TUBE_SIDE_LEFT: u8 = sheet(10, 1);
pub const TUBE_SIDE_RIGHT: u8 = sheet(11, 1);

pub const CANNON_TOP: u8 = sheet(14, 0);
pub const CANNON_BODY: u8 = sheet(14, 1);

pub const BLUE_GOAL_TOP: u8 = sheet(12, 4);
pub const BLUE_GOAL: u8 = sheet(12, 5);
pub const PURPLE_GOAL_TOP: u8 = sheet(13, 4);
pub const PURPLE_GOAL: u8 = sheet(13, 5);
pub const GOAL_BAR: u8 = sheet(13, 3);
pub const GOAL_BAR_END: u8 = sheet(12, 3);

/// Tiles that make up the end-of-level goal. They must never appear mid-level.
pub fn is_goal_marker(tile: u8) -> bool {
    matches!(
        tile,
        GOAL_BAR | GOAL_BAR_END | PURPLE_GOAL | PURPLE_GOAL_TOP | BLUE_GOAL | BLUE_GOAL_TOP
    )
}

/// Interior tiles of multi-cell structures; a column containing one cannot be a
/// crossover cut point.
pub fn is_fragile(tile: u8) -> bool {
    matches!(
        tile,
        HILL_FILL | HILL_LEFT | HILL_RIGHT | TUBE_SIDE_LEFT | TUBE_SIDE_RIGHT
    )
}

/// Tiles the player has to jump onto or over.
pub fn requires_jump(tile: u8) -> bool {
    matches!(
        tile,
        HILL_TOP_LEFT | CANNON_TOP | LEFT_GRASS_EDGE | TUBE_TOP_LEFT
    )
}

/// Ground-line tiles that pipe removal leaves in place.
pub fn is_ground_line(tile: u8) -> bool {
    tile == GRASS || tile == GROUND
}
