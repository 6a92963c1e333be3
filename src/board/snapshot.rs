//! Board snapshots as produced by the external game engine
//!
//! The renderer never mutates a snapshot; it only diffs consecutive ones.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tile::TileKind;

/// Integer board coordinate (column `x`, row `y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Payload of a block sitting on (or swallowed by) a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub tile_type: TileKind,
}

/// One board cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub tile_type: TileKind,
    /// Movable block resting on this cell
    #[serde(default)]
    pub block: Option<BlockInfo>,
    /// Block consumed by this (hole) cell
    #[serde(default)]
    pub block_in_hole: Option<BlockInfo>,
    /// Move numbers at which the player visited this cell, oldest first
    #[serde(default)]
    pub text: Vec<u32>,
}

impl Cell {
    pub fn new(tile_type: TileKind) -> Self {
        Self {
            tile_type,
            ..Default::default()
        }
    }

    pub fn with_block(mut self, kind: TileKind) -> Self {
        self.block = Some(BlockInfo { tile_type: kind });
        self
    }

    pub fn with_block_in_hole(mut self, kind: TileKind) -> Self {
        self.block_in_hole = Some(BlockInfo { tile_type: kind });
        self
    }

    /// Step number of the most recent visit, or -1 if never visited.
    ///
    /// -1 is distinct from 0, which means "visited at the first step".
    pub fn trail_step(&self) -> f32 {
        self.text.last().map(|&step| step as f32).unwrap_or(-1.0)
    }

    pub fn block_kind(&self) -> Option<TileKind> {
        self.block.map(|b| b.tile_type)
    }

    /// A hole that already holds a block offers no movement affordances
    pub fn is_filled_hole(&self) -> bool {
        self.tile_type == TileKind::Hole && self.block_in_hole.is_some()
    }
}

/// Which predicate decides that the level is "truly solved"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VictoryRule {
    /// Standing on the exit is enough
    #[default]
    ReachExit,
    /// Standing on the exit without exceeding the least-moves target
    ReachExitInLeastMoves,
}

/// Complete game state handed to the renderer on every update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    /// Row-major cells: `cells[y][x]`
    pub cells: Vec<Vec<Cell>>,
    pub player: GridCoord,
    #[serde(default)]
    pub move_count: u32,
    #[serde(default)]
    pub least_moves: u32,
    /// External "game is complete" predicate (drives player coloring)
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub victory_rule: VictoryRule,
}

impl BoardSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Board width in cells (width of the first row)
    pub fn width(&self) -> usize {
        self.cells.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn cell(&self, coord: GridCoord) -> Option<&Cell> {
        if coord.x < 0 || coord.y < 0 {
            return None;
        }
        self.cells
            .get(coord.y as usize)
            .and_then(|row| row.get(coord.x as usize))
    }

    /// All cells in row-major scan order
    pub fn iter_cells(&self) -> impl Iterator<Item = (GridCoord, &Cell)> {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, cell)| (GridCoord::new(x as i32, y as i32), cell))
        })
    }

    pub fn player_on_exit(&self) -> bool {
        self.cell(self.player)
            .map(|c| c.tile_type == TileKind::PlayerOnExit)
            .unwrap_or(false)
    }

    /// Victory predicate selected by the game type
    pub fn is_solved(&self) -> bool {
        match self.victory_rule {
            VictoryRule::ReachExit => self.player_on_exit(),
            VictoryRule::ReachExitInLeastMoves => {
                self.player_on_exit() && self.move_count <= self.least_moves
            }
        }
    }
}
