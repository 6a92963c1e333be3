//! Animation registry
//!
//! Diffs consecutive board snapshots into tweens and overlays, answers
//! "where is this entity right now" queries, and drops effects once they
//! complete. Effects outlive the board data that triggered them: a block can
//! still be fading inside a hole after the board reports the cell settled.

use std::collections::{HashMap, HashSet};

use glam::Vec2;

use super::key::{FloatingKey, OverlayKey, TweenKey};
use super::matching::{find_vacated_source, gained_blocks};
use super::tween::{FloatingBlock, Overlay, Tween};
use crate::board::{BoardSnapshot, GridCoord, TileKind};
use crate::consts::{HOLE_FADE_DURATION_MS, MOVE_DURATION_MS};

/// What a single diff scheduled (for logging and tests)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub player_moved: bool,
    pub block_moves: usize,
    pub hole_fills: usize,
}

impl ScheduleReport {
    pub fn is_empty(&self) -> bool {
        !self.player_moved && self.block_moves == 0 && self.hole_fills == 0
    }
}

/// A floating block sampled at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingSample {
    pub key: FloatingKey,
    pub block_type: TileKind,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct AnimationRegistry {
    enabled: bool,
    tweens: HashMap<TweenKey, Tween>,
    overlays: HashMap<OverlayKey, Overlay>,
    /// Insertion-ordered; drawn in this order above the board
    floating: Vec<(FloatingKey, FloatingBlock)>,
}

impl Default for AnimationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self {
            enabled: true,
            tweens: HashMap::new(),
            overlays: HashMap::new(),
            floating: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops everything in flight; every query becomes identity
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
        self.overlays.clear();
        self.floating.clear();
    }

    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn floating_count(&self) -> usize {
        self.floating.len()
    }

    pub fn tween(&self, key: TweenKey) -> Option<&Tween> {
        self.tweens.get(&key)
    }

    pub fn overlay(&self, key: OverlayKey) -> Option<&Overlay> {
        self.overlays.get(&key)
    }

    pub fn floating(&self, key: FloatingKey) -> Option<&FloatingBlock> {
        self.floating.iter().find(|(k, _)| *k == key).map(|(_, f)| f)
    }

    /// A floating block bound for `hole` is still owed a frame
    pub fn is_landing(&self, hole: GridCoord) -> bool {
        self.enabled && self.floating.iter().any(|(k, _)| k.to == hole)
    }

    // ========================================================================
    // SCHEDULING
    // ========================================================================

    /// Diff `prev` against `curr` and schedule player moves, block moves and
    /// hole fills at time `now`.
    ///
    /// Without a previous snapshot, or with animation disabled, nothing is
    /// scheduled and everything renders at its board position.
    pub fn schedule_from_diff(
        &mut self,
        prev: Option<&BoardSnapshot>,
        curr: &BoardSnapshot,
        now: f64,
    ) -> ScheduleReport {
        let mut report = ScheduleReport::default();
        let Some(prev) = prev else {
            return report;
        };
        if !self.enabled {
            return report;
        }

        if prev.player != curr.player {
            self.schedule_player_move(prev.player, curr.player, now);
            report.player_moved = true;
        }

        // Hole fills claim their sources first so a swallowed block is never
        // also matched as an ordinary move.
        let mut claimed = HashSet::new();
        let fills = hole_fills(prev, curr, &mut claimed);
        let moves = block_moves(prev, curr, &mut claimed);

        // Start positions are read before any tween is replaced so chained
        // moves within one update see the pre-update state.
        let fill_starts: Vec<Option<Vec2>> = fills
            .iter()
            .map(|fill| fill.source.map(|from| self.live_cell_position(from, now)))
            .collect();
        let move_starts: Vec<Vec2> = moves
            .iter()
            .map(|(from, _, _)| self.live_cell_position(*from, now))
            .collect();

        for (from, _, _) in &moves {
            self.tweens.remove(&TweenKey::Cell(*from));
        }
        for fill in &fills {
            if let Some(from) = fill.source {
                self.tweens.remove(&TweenKey::Cell(from));
            }
        }

        for ((from, to, kind), start) in moves.iter().zip(move_starts) {
            log::debug!("Block {:?} moves ({}, {}) -> ({}, {})", kind, from.x, from.y, to.x, to.y);
            self.tweens.insert(
                TweenKey::Cell(*to),
                Tween::new(start, to.as_vec2(), now, MOVE_DURATION_MS),
            );
        }
        report.block_moves = moves.len();

        for (fill, start) in fills.iter().zip(fill_starts) {
            self.schedule_hole_fill(fill, start, now);
        }
        report.hole_fills = fills.len();

        report
    }

    fn schedule_player_move(&mut self, from: GridCoord, to: GridCoord, now: f64) {
        // Continue from wherever an in-flight move has got to
        let start = self.live_position(TweenKey::Player(from), from.as_vec2(), now);
        self.tweens.retain(|key, _| !matches!(key, TweenKey::Player(_)));
        self.tweens.insert(
            TweenKey::Player(to),
            Tween::new(start, to.as_vec2(), now, MOVE_DURATION_MS),
        );
        log::debug!("Player moves ({}, {}) -> ({}, {})", from.x, from.y, to.x, to.y);
    }

    /// Slide (floating block), then fade (block-fade overlay delayed by the
    /// slide), with the hole background fading from `now`.
    fn schedule_hole_fill(&mut self, fill: &HoleFill, slide_start: Option<Vec2>, now: f64) {
        let hole = fill.hole;
        let slide_duration = match (fill.source, slide_start) {
            (Some(from), Some(start)) => {
                let key = FloatingKey { from, to: hole };
                let block = FloatingBlock {
                    block_type: fill.kind,
                    tween: Tween::new(start, hole.as_vec2(), now, MOVE_DURATION_MS),
                };
                match self.floating.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = block,
                    None => self.floating.push((key, block)),
                }
                MOVE_DURATION_MS
            }
            _ => 0.0,
        };

        self.overlays.insert(
            OverlayKey::HoleFill(hole),
            Overlay {
                start_time: now,
                duration: HOLE_FADE_DURATION_MS,
                block_type: Some(fill.kind),
            },
        );
        self.overlays.insert(
            OverlayKey::BlockFade(hole),
            Overlay {
                start_time: now + slide_duration,
                duration: HOLE_FADE_DURATION_MS,
                block_type: Some(fill.kind),
            },
        );
        log::debug!(
            "Hole fill at ({}, {}) with {:?}, source {:?}",
            hole.x,
            hole.y,
            fill.kind,
            fill.source
        );
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Interpolated position for `key`, or `target` when nothing is in flight.
    ///
    /// A tween that has completed is removed by the query that observes it.
    pub fn interpolated_position(&mut self, key: TweenKey, target: Vec2, now: f64) -> Vec2 {
        if !self.enabled {
            return target;
        }
        let Some(tween) = self.tweens.get(&key) else {
            return target;
        };
        let pos = tween.position(now);
        if tween.is_finished(now) {
            self.tweens.remove(&key);
        }
        pos
    }

    /// Rendered position of whatever occupies `cell`
    pub fn cell_position(&mut self, cell: GridCoord, now: f64) -> Vec2 {
        self.interpolated_position(TweenKey::Cell(cell), cell.as_vec2(), now)
    }

    /// Rendered position of the player standing (logically) on `cell`
    pub fn player_position(&mut self, cell: GridCoord, now: f64) -> Vec2 {
        self.interpolated_position(TweenKey::Player(cell), cell.as_vec2(), now)
    }

    /// Fade fraction in [0, 1] for an overlay, 0 when no such overlay exists.
    ///
    /// The overlay is removed by the query that observes completion.
    pub fn fade_progress(&mut self, key: OverlayKey, now: f64) -> f32 {
        let Some(overlay) = self.overlays.get(&key) else {
            return 0.0;
        };
        let progress = overlay.progress(now);
        if progress >= 1.0 {
            self.overlays.remove(&key);
        }
        progress
    }

    /// Overlay exists and has not completed
    pub fn is_overlay_active(&self, key: OverlayKey, now: f64) -> bool {
        self.overlays
            .get(&key)
            .map(|o| !o.is_finished(now))
            .unwrap_or(false)
    }

    /// Overlay exists and its (possibly delayed) start time has passed
    pub fn overlay_started(&self, key: OverlayKey, now: f64) -> bool {
        self.overlays
            .get(&key)
            .map(|o| !o.is_pending(now))
            .unwrap_or(false)
    }

    /// Floating blocks in insertion order at `now`; completed ones are sampled
    /// one last time at their target and then dropped.
    pub fn floating_blocks(&mut self, now: f64) -> Vec<FloatingSample> {
        if !self.enabled {
            return Vec::new();
        }
        let samples = self
            .floating
            .iter()
            .map(|(key, block)| FloatingSample {
                key: *key,
                block_type: block.block_type,
                position: block.tween.position(now),
            })
            .collect();
        self.floating.retain(|(_, block)| !block.tween.is_finished(now));
        samples
    }

    /// Drop every completed tween, overlay and floating block
    pub fn collect_garbage(&mut self, now: f64) {
        self.tweens.retain(|_, t| !t.is_finished(now));
        self.overlays.retain(|_, o| !o.is_finished(now));
        self.floating.retain(|(_, f)| !f.tween.is_finished(now));
    }

    /// Live position of the block at `cell` without consuming its tween
    fn live_cell_position(&self, cell: GridCoord, now: f64) -> Vec2 {
        self.tweens
            .get(&TweenKey::Cell(cell))
            .map(|t| t.position(now))
            .unwrap_or_else(|| cell.as_vec2())
    }

    fn live_position(&self, key: TweenKey, fallback: Vec2, now: f64) -> Vec2 {
        self.tweens
            .get(&key)
            .map(|t| t.position(now))
            .unwrap_or(fallback)
    }
}

/// A hole that newly swallowed a block
#[derive(Debug, Clone, Copy)]
struct HoleFill {
    hole: GridCoord,
    kind: TileKind,
    source: Option<GridCoord>,
}

fn hole_fills(
    prev: &BoardSnapshot,
    curr: &BoardSnapshot,
    claimed: &mut HashSet<GridCoord>,
) -> Vec<HoleFill> {
    let mut fills = Vec::new();
    for (coord, cell) in curr.iter_cells() {
        if cell.tile_type != TileKind::Hole {
            continue;
        }
        let Some(payload) = cell.block_in_hole else {
            continue;
        };
        let had_block = prev
            .cell(coord)
            .map(|c| c.block_in_hole.is_some())
            .unwrap_or(false);
        if had_block {
            continue;
        }
        let source = find_vacated_source(prev, curr, payload.tile_type, claimed);
        if let Some(from) = source {
            claimed.insert(from);
        }
        fills.push(HoleFill {
            hole: coord,
            kind: payload.tile_type,
            source,
        });
    }
    fills
}

fn block_moves(
    prev: &BoardSnapshot,
    curr: &BoardSnapshot,
    claimed: &mut HashSet<GridCoord>,
) -> Vec<(GridCoord, GridCoord, TileKind)> {
    let mut moves = Vec::new();
    for (to, kind) in gained_blocks(prev, curr) {
        if let Some(from) = find_vacated_source(prev, curr, kind, claimed) {
            claimed.insert(from);
            moves.push((from, to, kind));
        }
    }
    moves
}
