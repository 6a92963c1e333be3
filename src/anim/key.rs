//! Structured animation keys
//!
//! Each registry is keyed by entity kind plus coordinate, so two effects can
//! only collide when they describe the same entity.

use crate::board::{GridCoord, TileKind};

/// Identity of a position tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenKey {
    /// Block or tile that moved into this cell
    Cell(GridCoord),
    /// Player moving toward this cell
    Player(GridCoord),
}

/// Identity of a fade overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKey {
    /// Hole background transition after a block falls in
    HoleFill(GridCoord),
    /// Swallowed block fading out inside the hole
    BlockFade(GridCoord),
}

impl OverlayKey {
    pub fn coord(self) -> GridCoord {
        match self {
            OverlayKey::HoleFill(c) | OverlayKey::BlockFade(c) => c,
        }
    }
}

/// Identity of a block sliding independently of any cell redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatingKey {
    pub from: GridCoord,
    pub to: GridCoord,
}

/// Identity of a tracked logical position (for velocity/motion blur)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKey {
    Block { kind: TileKind, at: GridCoord },
    Player,
}
