//! Draw orchestration
//!
//! Turns the sampled animation state into an ordered list of draw calls.
//! Per cell, in row-major order: base tile, then the resting block, then the
//! hole-fill composite when one is running. After the whole board come the
//! floating blocks (insertion order), and the player is always last.
//!
//! Nothing here touches the GPU; `pipeline::GridRenderState` replays a
//! `FramePlan` verbatim.

use glam::Vec2;

use super::builder::UniformBuilder;
use super::layout::{GridLayout, Rect};
use super::uniforms::{DrawUniforms, Globals};
use crate::anim::{AnimationRegistry, OverlayKey, PositionHistory, TrackKey};
use crate::board::{BoardSnapshot, TileKind};

/// Orchestrator state for the draw currently being emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawStage {
    Idle,
    BaseTile,
    BlockOverlay,
    FadeComposite,
    FloatingBlocks,
    Player,
}

impl DrawStage {
    /// Legal transitions within one frame
    pub fn can_enter(self, next: DrawStage) -> bool {
        use DrawStage::*;
        match (self, next) {
            (_, Idle) => true,
            (Idle, BaseTile | FloatingBlocks | Player) => true,
            (BaseTile, BaseTile | BlockOverlay | FadeComposite | FloatingBlocks | Player) => true,
            (BlockOverlay, BaseTile | FadeComposite | FloatingBlocks | Player) => true,
            (FadeComposite, FadeComposite | BaseTile | FloatingBlocks | Player) => true,
            (FloatingBlocks, FloatingBlocks | Player) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard source-over alpha blending
    Alpha,
    /// Source added onto the destination (hole-fill block only)
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub stage: DrawStage,
    pub blend: BlendMode,
    pub rect: Rect,
    pub uniforms: DrawUniforms,
}

/// Everything the GPU needs for one frame
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub layout: GridLayout,
    pub globals: Globals,
    pub draws: Vec<DrawCall>,
}

impl FramePlan {
    pub fn count(&self, stage: DrawStage) -> usize {
        self.draws.iter().filter(|d| d.stage == stage).count()
    }

    pub fn stages(&self) -> Vec<DrawStage> {
        self.draws.iter().map(|d| d.stage).collect()
    }
}

/// Collects draw calls while enforcing the stage ordering
#[derive(Debug)]
pub struct FramePlanner {
    layout: GridLayout,
    stage: DrawStage,
    draws: Vec<DrawCall>,
}

impl FramePlanner {
    pub fn begin(layout: GridLayout) -> Self {
        Self {
            layout,
            stage: DrawStage::Idle,
            draws: Vec::new(),
        }
    }

    pub fn stage(&self) -> DrawStage {
        self.stage
    }

    /// Emit a quad covering the tile at grid position `pos`
    pub fn push(&mut self, stage: DrawStage, blend: BlendMode, pos: Vec2, uniforms: DrawUniforms) {
        debug_assert!(
            self.stage.can_enter(stage),
            "illegal draw stage transition {:?} -> {:?}",
            self.stage,
            stage
        );
        self.stage = stage;
        let rect = self.layout.cell_rect(pos);
        log::trace!("{:?} {:?} at ({:.2}, {:.2})", stage, blend, pos.x, pos.y);
        self.draws.push(DrawCall {
            stage,
            blend,
            rect,
            uniforms,
        });
    }

    pub fn finish(mut self, globals: Globals) -> FramePlan {
        self.stage = DrawStage::Idle;
        FramePlan {
            layout: self.layout,
            globals,
            draws: self.draws,
        }
    }
}

/// Sampled player state for the final draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSample {
    pub kind: TileKind,
    pub position: Vec2,
    pub previous: Vec2,
    pub velocity: Vec2,
    pub complete: bool,
    pub complete_time: f32,
}

/// Mutable animation state a frame samples from
pub struct FrameContext<'a> {
    pub board: &'a BoardSnapshot,
    pub registry: &'a mut AnimationRegistry,
    pub history: &'a mut PositionHistory,
    pub builder: UniformBuilder,
    pub now: f64,
}

/// Build the full ordered draw list for one frame
pub fn plan_frame(
    layout: GridLayout,
    ctx: FrameContext<'_>,
    player: PlayerSample,
    globals: Globals,
) -> FramePlan {
    let FrameContext {
        board,
        registry,
        history,
        builder,
        now,
    } = ctx;
    let mut planner = FramePlanner::begin(layout);

    for (coord, cell) in board.iter_cells() {
        planner.push(
            DrawStage::BaseTile,
            BlendMode::Alpha,
            coord.as_vec2(),
            builder.tile(coord, cell),
        );

        if let Some(kind) = cell.block_kind() {
            let pos = registry.cell_position(coord, now);
            let (previous, velocity) = history.track(TrackKey::Block { kind, at: coord }, pos);
            planner.push(
                DrawStage::BlockOverlay,
                BlendMode::Alpha,
                pos,
                builder.block(kind, pos, previous, velocity),
            );
        }

        let fill_key = OverlayKey::HoleFill(coord);
        if registry.is_overlay_active(fill_key, now) {
            let fill = registry.fade_progress(fill_key, now);
            planner.push(
                DrawStage::FadeComposite,
                BlendMode::Alpha,
                coord.as_vec2(),
                builder.hole_background(coord, cell, fill),
            );
        }

        // The block fade runs on its own clock, delayed by the slide, so it
        // outlives the hole background. It appears once the floating block
        // has made its last draw.
        let fade_key = OverlayKey::BlockFade(coord);
        if registry.overlay_started(fade_key, now)
            && registry.is_overlay_active(fade_key, now)
            && !registry.is_landing(coord)
        {
            let kind = registry
                .overlay(fade_key)
                .and_then(|o| o.block_type)
                .or_else(|| cell.block_in_hole.map(|b| b.tile_type))
                .unwrap_or(TileKind::Block);
            let fade = registry.fade_progress(fade_key, now);
            planner.push(
                DrawStage::FadeComposite,
                BlendMode::Additive,
                coord.as_vec2(),
                builder.fading_block(coord, kind, fade),
            );
        }
    }

    for sample in registry.floating_blocks(now) {
        planner.push(
            DrawStage::FloatingBlocks,
            BlendMode::Alpha,
            sample.position,
            builder.floating(sample.block_type, sample.position),
        );
    }

    planner.push(
        DrawStage::Player,
        BlendMode::Alpha,
        player.position,
        builder.player(
            player.kind,
            player.position,
            player.previous,
            player.velocity,
            player.complete,
            player.complete_time,
        ),
    );

    planner.finish(globals)
}
