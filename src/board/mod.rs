//! Read-only board model
//!
//! Snapshots come from the external game engine once per game-state update.
//! Nothing in this module knows about time, animation, or the GPU.

pub mod snapshot;
pub mod tile;

pub use snapshot::{BlockInfo, BoardSnapshot, Cell, GridCoord, VictoryRule};
pub use tile::TileKind;
