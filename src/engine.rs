//! Animation engine
//!
//! `GridEngine` owns every piece of mutable animation state for one canvas:
//! tween and overlay registries, the shadow follower, the particle swarm,
//! position history and the completion/victory timers. Two entry points
//! mutate it, both on the host's single thread: `apply_state` when the game
//! publishes a new board, and `frame` once per display refresh.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::anim::{
    AnimationRegistry, MotionTrail, ParticleSwarm, PlayerEffects, PositionHistory,
    ScheduleReport, ShadowTracker, TrackKey, VictoryTracker,
};
use crate::board::{BoardSnapshot, GridCoord, TileKind};
use crate::error::RenderError;
use crate::ms_to_secs;
use crate::renderer::frame::{FrameContext, PlayerSample, plan_frame};
use crate::renderer::{FramePlan, Globals, GridLayout, UniformBuilder};
use crate::settings::Settings;

pub struct GridEngine {
    registry: AnimationRegistry,
    shadow: ShadowTracker,
    particles: ParticleSwarm,
    history: PositionHistory,
    trail: MotionTrail,
    player_effects: PlayerEffects,
    victory: VictoryTracker,
    rng: Pcg32,
    settings: Settings,

    board: Option<BoardSnapshot>,
    /// Pointer position in canvas pixels
    mouse: Vec2,
    /// First frame time (ms); `u_time` counts from here
    start_time: Option<f64>,
    last_frame: Option<f64>,
}

impl GridEngine {
    pub fn new(settings: Settings) -> Self {
        Self::with_seed(settings, 0x5EED)
    }

    /// Engine with a fixed seed for victory effect selection
    pub fn with_seed(settings: Settings, seed: u64) -> Self {
        let mut registry = AnimationRegistry::new();
        registry.set_enabled(settings.animations);
        Self {
            registry,
            shadow: ShadowTracker::new(),
            particles: ParticleSwarm::new(),
            history: PositionHistory::new(),
            trail: MotionTrail::new(),
            player_effects: PlayerEffects::new(),
            victory: VictoryTracker::new(),
            rng: Pcg32::seed_from_u64(seed),
            settings,
            board: None,
            mouse: Vec2::ZERO,
            start_time: None,
            last_frame: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.registry.set_enabled(settings.animations);
        self.settings = settings;
    }

    /// Global animation switch; turning it off drops everything in flight
    pub fn set_animations(&mut self, enabled: bool) {
        self.settings.animations = enabled;
        self.registry.set_enabled(enabled);
    }

    pub fn board(&self) -> Option<&BoardSnapshot> {
        self.board.as_ref()
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    /// Take a new board from the game and schedule whatever changed.
    ///
    /// A board of different dimensions is a new level: all animation state
    /// is discarded and nothing is scheduled for it.
    pub fn apply_state(&mut self, snapshot: BoardSnapshot, now: f64) -> ScheduleReport {
        let new_level = self
            .board
            .as_ref()
            .is_some_and(|prev| prev.dimensions() != snapshot.dimensions());
        if new_level {
            log::info!(
                "Board resized to {}x{}, resetting animations",
                snapshot.width(),
                snapshot.height()
            );
            self.reset();
            self.board = None;
        }

        let report = self
            .registry
            .schedule_from_diff(self.board.as_ref(), &snapshot, now);
        if !report.is_empty() {
            log::debug!(
                "Scheduled: player {} blocks {} holes {}",
                report.player_moved,
                report.block_moves,
                report.hole_fills
            );
        }
        self.board = Some(snapshot);
        report
    }

    /// `apply_state` for a JSON snapshot from the host
    pub fn apply_json(&mut self, json: &str, now: f64) -> Result<ScheduleReport, RenderError> {
        let snapshot = BoardSnapshot::from_json(json)?;
        Ok(self.apply_state(snapshot, now))
    }

    /// Override the game's "complete" predicate on the current board
    pub fn set_complete(&mut self, complete: bool) {
        if let Some(board) = self.board.as_mut() {
            board.complete = complete;
        }
    }

    pub fn set_mouse(&mut self, x: f32, y: f32) {
        self.mouse = Vec2::new(x, y);
    }

    /// Drop all animation state; the next frame starts fresh
    pub fn reset(&mut self) {
        self.registry.clear();
        self.shadow.reset();
        self.particles.reset();
        self.history.clear();
        self.trail.clear();
        self.player_effects.reset();
        self.victory.reset();
        self.start_time = None;
        self.last_frame = None;
    }

    /// Board cell under a canvas pixel, using the same layout as drawing
    pub fn cell_at(&self, canvas: (f32, f32), px: f32, py: f32) -> Option<GridCoord> {
        let board = self.board.as_ref()?;
        GridLayout::compute(canvas, board.dimensions()).cell_at(px, py)
    }

    /// Interpolated player position at `now`
    pub fn player_position(&mut self, now: f64) -> Option<Vec2> {
        let player = self.board.as_ref()?.player;
        Some(self.registry.player_position(player, now))
    }

    /// Advance every simulation by one frame and build its draw list.
    ///
    /// Returns `None` when there is no board yet or the canvas has no area.
    pub fn frame(&mut self, now: f64, canvas: (f32, f32)) -> Option<FramePlan> {
        let board = self.board.as_ref()?;
        let layout = GridLayout::compute(canvas, board.dimensions());
        if !layout.is_drawable() {
            return None;
        }

        let start = *self.start_time.get_or_insert(now);
        let dt = self.last_frame.map(|last| ms_to_secs(now - last)).unwrap_or(0.0);
        self.last_frame = Some(now);

        if self.settings.particles {
            self.particles.step(dt);
        }

        self.history.begin_frame();
        let player_pos = self.registry.player_position(board.player, now);
        let (player_prev, player_vel) = self.history.track(TrackKey::Player, player_pos);
        self.trail.record(player_pos);
        let shadow_pos = self.shadow.update(player_pos, now);

        self.player_effects.update(board.complete, now);
        self.victory.update(board.is_solved(), now, &mut self.rng);

        let complete_time = if self.settings.effective_complete_shake() {
            self.player_effects.complete_time(now)
        } else {
            -1.0
        };
        let player_kind = board
            .cell(board.player)
            .map(|c| c.tile_type)
            .filter(|kind| kind.is_player())
            .unwrap_or(TileKind::Player);

        let globals = Globals {
            resolution: layout.resolution().to_array(),
            mouse_pos: self.mouse.to_array(),
            shadow_pos: shadow_pos.to_array(),
            time: ms_to_secs(now - start),
            particle_count: self.settings.particle_count() as f32,
            current_step_count: board.move_count as f32,
            goal_step_count: board.least_moves as f32,
            victory_time: self.victory.victory_time(now),
            victory_effect: self.victory.effect().shader_code(),
            particles: self.particles.uniform_data(),
            motion_blur_trail: self.trail.uniform_data(),
        };

        let builder = UniformBuilder {
            victory_intensity: self.victory.intensity(now),
            motion_blur: self.settings.effective_motion_blur(),
        };
        let player = PlayerSample {
            kind: player_kind,
            position: player_pos,
            previous: player_prev,
            velocity: player_vel,
            complete: board.complete,
            complete_time,
        };

        let plan = plan_frame(
            layout,
            FrameContext {
                board,
                registry: &mut self.registry,
                history: &mut self.history,
                builder,
                now,
            },
            player,
            globals,
        );

        self.history.end_frame();
        self.registry.collect_garbage(now);
        Some(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::renderer::{BlendMode, DrawStage};

    fn board(cells: Vec<Vec<Cell>>, player: GridCoord) -> BoardSnapshot {
        BoardSnapshot {
            cells,
            player,
            ..Default::default()
        }
    }

    fn corridor(player_x: i32) -> BoardSnapshot {
        let cells = (0..3)
            .map(|x| {
                if x == player_x {
                    Cell::new(TileKind::Player)
                } else {
                    Cell::new(TileKind::Default)
                }
            })
            .collect();
        board(vec![cells], GridCoord::new(player_x, 0))
    }

    const CANVAS: (f32, f32) = (300.0, 100.0);

    #[test]
    fn test_player_move_end_to_end() {
        let mut engine = GridEngine::new(Settings::default());
        let t0 = 1000.0;
        engine.apply_state(corridor(0), t0);
        engine.apply_state(corridor(1), t0);

        let mid = engine.player_position(t0 + 50.0).unwrap();
        assert!(mid.x > 0.0 && mid.x < 1.0, "x = {}", mid.x);

        let plan = engine.frame(t0 + 150.0, CANVAS).unwrap();
        let player = plan.draws.last().unwrap();
        assert_eq!(player.stage, DrawStage::Player);
        assert_eq!(player.uniforms.current_pos, [1.0, 0.0]);
        assert_eq!(engine.player_position(t0 + 150.0), Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_first_snapshot_is_identity() {
        let mut engine = GridEngine::new(Settings::default());
        let report = engine.apply_state(corridor(2), 0.0);
        assert!(report.is_empty());
        assert_eq!(engine.player_position(0.0), Some(Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_animations_disabled_snaps() {
        let mut engine = GridEngine::new(Settings {
            animations: false,
            ..Settings::default()
        });
        engine.apply_state(corridor(0), 0.0);
        let report = engine.apply_state(corridor(1), 0.0);
        assert!(report.is_empty());
        assert_eq!(engine.player_position(10.0), Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_new_level_resets() {
        let mut engine = GridEngine::new(Settings::default());
        engine.apply_state(corridor(0), 0.0);
        engine.apply_state(corridor(1), 0.0);
        assert_eq!(engine.registry().tween_count(), 1);

        let bigger = board(
            vec![vec![Cell::new(TileKind::Player), Cell::new(TileKind::Default)]; 2],
            GridCoord::new(0, 0),
        );
        let report = engine.apply_state(bigger, 10.0);
        assert!(report.is_empty());
        assert_eq!(engine.registry().tween_count(), 0);
    }

    #[test]
    fn test_frame_without_board_or_area() {
        let mut engine = GridEngine::new(Settings::default());
        assert!(engine.frame(0.0, CANVAS).is_none());
        engine.apply_state(corridor(0), 0.0);
        assert!(engine.frame(0.0, (0.0, 0.0)).is_none());
        assert!(engine.frame(16.0, CANVAS).is_some());
    }

    #[test]
    fn test_draw_order_with_block() {
        let mut engine = GridEngine::new(Settings::default());
        let cells = vec![vec![
            Cell::new(TileKind::Player),
            Cell::new(TileKind::Default).with_block(TileKind::Block),
            Cell::new(TileKind::Wall),
        ]];
        engine.apply_state(board(cells, GridCoord::new(0, 0)), 0.0);
        let plan = engine.frame(0.0, CANVAS).unwrap();
        use DrawStage::*;
        assert_eq!(
            plan.stages(),
            vec![BaseTile, BaseTile, BlockOverlay, BaseTile, Player]
        );
        assert_eq!(plan.globals.resolution, [300.0, 100.0]);
    }

    /// Player pushes the block at (1, 0) into the hole at (2, 0)
    fn hole_fill_boards() -> (BoardSnapshot, BoardSnapshot) {
        let before = board(
            vec![vec![
                Cell::new(TileKind::Player),
                Cell::new(TileKind::Default).with_block(TileKind::Block),
                Cell::new(TileKind::Hole),
            ]],
            GridCoord::new(0, 0),
        );
        let after = board(
            vec![vec![
                Cell::new(TileKind::Default),
                Cell::new(TileKind::Player),
                Cell::new(TileKind::Hole).with_block_in_hole(TileKind::Block),
            ]],
            GridCoord::new(1, 0),
        );
        (before, after)
    }

    #[test]
    fn test_hole_fill_composite() {
        let mut engine = GridEngine::new(Settings::default());
        let t0 = 0.0;
        let (before, after) = hole_fill_boards();
        engine.apply_state(before, t0);
        let report = engine.apply_state(after, t0);
        assert_eq!(report.hole_fills, 1);
        assert!(report.player_moved);

        use DrawStage::*;
        // Sliding: hole background only, block drawn on top of the board
        let plan = engine.frame(t0 + 50.0, CANVAS).unwrap();
        assert_eq!(
            plan.stages(),
            vec![BaseTile, BaseTile, BaseTile, FadeComposite, FloatingBlocks, Player]
        );
        let floating = &plan.draws[4];
        assert!(floating.uniforms.current_pos[0] > 1.0 && floating.uniforms.current_pos[0] < 2.0);

        engine.frame(t0 + 150.0, CANVAS);

        // Slide done: the swallowed block fades additively over the hole
        let plan = engine.frame(t0 + 200.0, CANVAS).unwrap();
        assert_eq!(
            plan.stages(),
            vec![BaseTile, BaseTile, BaseTile, FadeComposite, FadeComposite, Player]
        );
        assert_eq!(plan.draws[3].blend, BlendMode::Alpha);
        assert_eq!(plan.draws[4].blend, BlendMode::Additive);
        assert_eq!(plan.draws[4].uniforms.tile_type, 3.0);
        assert!(plan.draws[4].uniforms.hole_fill_progress > 0.0);

        // Both overlays are gone once their fades complete
        let plan = engine.frame(t0 + 2200.0, CANVAS).unwrap();
        assert_eq!(plan.count(FadeComposite), 0);
    }

    #[test]
    fn test_block_fade_outlives_hole_background() {
        let mut engine = GridEngine::new(Settings::default());
        let t0 = 0.0;
        let (before, after) = hole_fill_boards();
        engine.apply_state(before, t0);
        engine.apply_state(after, t0);

        use DrawStage::*;
        engine.frame(t0 + 50.0, CANVAS);

        // The slide ends this frame: the block is drawn once more at the
        // hole and the fade waits for the next frame
        let plan = engine.frame(t0 + 100.0, CANVAS).unwrap();
        assert_eq!(plan.count(FloatingBlocks), 1);
        assert_eq!(plan.count(FadeComposite), 1);
        assert_eq!(plan.draws[3].blend, BlendMode::Alpha);

        let plan = engine.frame(t0 + 116.0, CANVAS).unwrap();
        assert_eq!(plan.count(FloatingBlocks), 0);
        assert_eq!(plan.count(FadeComposite), 2);

        // Hole background is done, the delayed block fade still finishes
        let plan = engine.frame(t0 + 2050.0, CANVAS).unwrap();
        assert_eq!(
            plan.stages(),
            vec![BaseTile, BaseTile, BaseTile, FadeComposite, Player]
        );
        assert_eq!(plan.draws[3].blend, BlendMode::Additive);
        assert!(plan.draws[3].uniforms.hole_fill_progress > 0.9);
    }

    #[test]
    fn test_victory_starts_on_solve() {
        let mut engine = GridEngine::with_seed(Settings::default(), 7);
        let solved = board(
            vec![vec![Cell::new(TileKind::Default), Cell::new(TileKind::PlayerOnExit)]],
            GridCoord::new(1, 0),
        );
        engine.apply_state(solved, 0.0);
        let plan = engine.frame(0.0, CANVAS).unwrap();
        assert_eq!(plan.globals.victory_time, 0.0);
        let plan = engine.frame(1000.0, CANVAS).unwrap();
        assert!((plan.globals.victory_time - 1.0).abs() < 1e-6);
        let plan = engine.frame(6000.0, CANVAS).unwrap();
        assert_eq!(plan.globals.victory_time, -1.0);
    }

    #[test]
    fn test_complete_shake_respects_reduced_motion() {
        let mut engine = GridEngine::new(Settings {
            reduced_motion: true,
            ..Settings::default()
        });
        let mut done = corridor(0);
        done.complete = true;
        engine.apply_state(done, 0.0);
        let plan = engine.frame(100.0, CANVAS).unwrap();
        let player = plan.draws.last().unwrap();
        assert_eq!(player.uniforms.player_complete_time, -1.0);
        assert_eq!(player.uniforms.motion_blur_strength, 0.0);

        engine.set_settings(Settings::default());
        engine.set_complete(false);
        engine.frame(116.0, CANVAS);
        engine.set_complete(true);
        let plan = engine.frame(132.0, CANVAS).unwrap();
        assert_eq!(plan.draws.last().unwrap().uniforms.player_complete_time, 0.0);
    }

    #[test]
    fn test_quality_limits_uploaded_particles() {
        let mut engine = GridEngine::new(Settings::from_preset(crate::QualityPreset::Low));
        engine.apply_state(corridor(0), 0.0);
        let plan = engine.frame(0.0, CANVAS).unwrap();
        assert_eq!(plan.globals.particle_count, 20.0);
    }

    #[test]
    fn test_cell_at_uses_draw_layout() {
        let mut engine = GridEngine::new(Settings::default());
        engine.apply_state(corridor(0), 0.0);
        assert_eq!(engine.cell_at(CANVAS, 150.0, 50.0), Some(GridCoord::new(1, 0)));
        assert_eq!(engine.cell_at((300.0, 300.0), 150.0, 10.0), None);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let mut engine = GridEngine::new(Settings::default());
        assert!(matches!(
            engine.apply_json("[1, 2", 0.0),
            Err(RenderError::InvalidSnapshot(_))
        ));
        assert!(engine.board().is_none());
    }
}
