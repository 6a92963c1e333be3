//! Per-draw uniform construction
//!
//! Every function here is pure: the engine samples the animation registries
//! first and hands the sampled positions in.

use bytemuck::Zeroable;
use glam::Vec2;

use super::uniforms::{DrawUniforms, player_color, tile_color};
use crate::anim::motion_blur_strength;
use crate::board::{Cell, GridCoord, TileKind};

/// Base glow per draw category, scaled up by the victory envelope
const TILE_GLOW: f32 = 0.6;
const BLOCK_GLOW: f32 = 0.8;
const PLAYER_GLOW: f32 = 1.0;

/// Deterministic per-cell seed that decorrelates per-tile particle phase
#[inline]
pub fn random_seed(x: f32, y: f32, tile_code: f32) -> f32 {
    (x * 31.7 + y * 17.3 + tile_code * 7.1) * 0.001
}

/// Frame-wide inputs that affect every draw
#[derive(Debug, Clone, Copy)]
pub struct UniformBuilder {
    /// Victory fade envelope in [0, 1]
    pub victory_intensity: f32,
    /// Motion blur enabled (settings and reduced motion)
    pub motion_blur: bool,
}

impl Default for UniformBuilder {
    fn default() -> Self {
        Self {
            victory_intensity: 0.0,
            motion_blur: true,
        }
    }
}

impl UniformBuilder {
    fn glow(&self, base: f32) -> f32 {
        base * (1.0 + self.victory_intensity)
    }

    fn blur(&self, velocity: Vec2) -> f32 {
        if self.motion_blur {
            motion_blur_strength(velocity)
        } else {
            0.0
        }
    }

    fn base(&self, kind: TileKind, pos: Vec2, glow: f32) -> DrawUniforms {
        let code = kind.shader_code();
        let mut u = DrawUniforms::zeroed();
        u.tile_grid_pos = pos.to_array();
        u.previous_pos = pos.to_array();
        u.current_pos = pos.to_array();
        u.tile_color = tile_color(kind);
        u.tile_type = code;
        u.glow_intensity = self.glow(glow);
        u.set_move_flags(kind.move_flags());
        u.random_seed = random_seed(pos.x, pos.y, code);
        u.trail_step_count = -1.0;
        u.player_complete_time = -1.0;
        u
    }

    /// Base tile of a board cell.
    ///
    /// The player's own cell renders as the floor beneath it; the player is
    /// drawn separately on top. A hole that already holds a block has no
    /// movement affordances and reports itself as filled.
    pub fn tile(&self, coord: GridCoord, cell: &Cell) -> DrawUniforms {
        let kind = cell.tile_type.floor();
        let mut u = self.base(kind, coord.as_vec2(), TILE_GLOW);
        u.trail_step_count = cell.trail_step();
        if cell.is_filled_hole() {
            u.set_move_flags([0.0; 4]);
            u.hole_fill_progress = 1.0;
        }
        u
    }

    /// Block resting on a cell, at its (possibly interpolated) position.
    ///
    /// Blocks never show trail numbers.
    pub fn block(
        &self,
        kind: TileKind,
        pos: Vec2,
        previous: Vec2,
        velocity: Vec2,
    ) -> DrawUniforms {
        let mut u = self.base(kind, pos, BLOCK_GLOW);
        u.trail_step_count = 0.0;
        u.previous_pos = previous.to_array();
        u.velocity = velocity.to_array();
        u.motion_blur_strength = self.blur(velocity);
        u
    }

    /// First half of the hole-fill composite: the hole background
    pub fn hole_background(&self, coord: GridCoord, cell: &Cell, fill_progress: f32) -> DrawUniforms {
        let mut u = self.base(TileKind::Hole, coord.as_vec2(), TILE_GLOW);
        u.trail_step_count = cell.trail_step();
        u.set_move_flags([0.0; 4]);
        u.hole_fill_progress = fill_progress;
        u
    }

    /// Second half of the hole-fill composite: the swallowed block fading out
    pub fn fading_block(&self, coord: GridCoord, kind: TileKind, fade_progress: f32) -> DrawUniforms {
        let mut u = self.base(kind, coord.as_vec2(), BLOCK_GLOW);
        u.trail_step_count = 0.0;
        u.set_move_flags([0.0; 4]);
        u.hole_fill_progress = fade_progress;
        u
    }

    /// Block sliding independently (into a hole), drawn above the board.
    ///
    /// The live tween position doubles as previous and current position.
    pub fn floating(&self, kind: TileKind, pos: Vec2) -> DrawUniforms {
        let mut u = self.base(kind, pos, BLOCK_GLOW);
        u.trail_step_count = 0.0;
        u
    }

    /// The player, always drawn last
    pub fn player(
        &self,
        kind: TileKind,
        pos: Vec2,
        previous: Vec2,
        velocity: Vec2,
        complete: bool,
        complete_time: f32,
    ) -> DrawUniforms {
        let kind = if kind.is_player() { kind } else { TileKind::Player };
        let mut u = self.base(kind, pos, PLAYER_GLOW);
        u.tile_color = player_color(complete);
        u.previous_pos = previous.to_array();
        u.velocity = velocity.to_array();
        u.motion_blur_strength = self.blur(velocity);
        u.player_complete_time = complete_time;
        u
    }
}
