//! Frame-to-frame position tracking
//!
//! Velocities are measured in logical grid units per frame, from the
//! previous sampled position of the same key. Keys not sampled during a
//! frame are dropped at the end of it, so history never carries over to an
//! unrelated block that later lands on the same cell.

use std::collections::HashMap;

use glam::Vec2;

use super::key::TrackKey;
use crate::consts::{MOTION_BLUR_GAIN, MOTION_BLUR_TRAIL};

#[derive(Debug, Clone, Copy)]
struct Sample {
    pos: Vec2,
    frame: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PositionHistory {
    samples: HashMap<TrackKey, Sample>,
    frame: u64,
}

impl PositionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        self.frame += 1;
    }

    /// Record `pos` for `key` and return `(previous, velocity)`.
    ///
    /// The first sample of a key has zero velocity and is its own previous.
    pub fn track(&mut self, key: TrackKey, pos: Vec2) -> (Vec2, Vec2) {
        let previous = self
            .samples
            .get(&key)
            .map(|s| s.pos)
            .unwrap_or(pos);
        self.samples.insert(
            key,
            Sample {
                pos,
                frame: self.frame,
            },
        );
        (previous, pos - previous)
    }

    /// Drop keys that were not sampled this frame
    pub fn end_frame(&mut self) {
        let frame = self.frame;
        self.samples.retain(|_, s| s.frame == frame);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Motion blur strength from a per-frame velocity, in [0, 1]
#[inline]
pub fn motion_blur_strength(velocity: Vec2) -> f32 {
    (velocity.length() * MOTION_BLUR_GAIN).min(1.0)
}

/// Recent player positions, newest first
#[derive(Debug, Clone, Default)]
pub struct MotionTrail {
    points: Vec<Vec2>,
}

impl MotionTrail {
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(MOTION_BLUR_TRAIL),
        }
    }

    pub fn record(&mut self, pos: Vec2) {
        self.points.insert(0, pos);
        if self.points.len() > MOTION_BLUR_TRAIL {
            self.points.pop();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Trail for `u_motionBlurTrail`; unused slots repeat the newest point.
    ///
    /// Uniform arrays use a 16-byte stride, so each point occupies `.xy` of a vec4.
    pub fn uniform_data(&self) -> [[f32; 4]; MOTION_BLUR_TRAIL] {
        let newest = self.points.first().copied().unwrap_or(Vec2::ZERO);
        let mut data = [[newest.x, newest.y, 0.0, 0.0]; MOTION_BLUR_TRAIL];
        for (slot, p) in data.iter_mut().zip(&self.points) {
            *slot = [p.x, p.y, 0.0, 0.0];
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{GridCoord, TileKind};

    fn block_key(x: i32, y: i32) -> TrackKey {
        TrackKey::Block {
            kind: TileKind::Block,
            at: GridCoord::new(x, y),
        }
    }

    #[test]
    fn test_velocity_from_previous_sample() {
        let mut history = PositionHistory::new();
        history.begin_frame();
        let (_, v) = history.track(block_key(1, 1), Vec2::new(0.5, 1.0));
        assert_eq!(v, Vec2::ZERO);
        history.end_frame();

        history.begin_frame();
        let (prev, v) = history.track(block_key(1, 1), Vec2::new(0.75, 1.0));
        assert_eq!(prev, Vec2::new(0.5, 1.0));
        assert_eq!(v, Vec2::new(0.25, 0.0));
        assert_eq!(motion_blur_strength(v), 1.0);
    }

    #[test]
    fn test_untouched_keys_are_pruned() {
        let mut history = PositionHistory::new();
        history.begin_frame();
        history.track(block_key(0, 0), Vec2::ZERO);
        history.track(block_key(1, 0), Vec2::X);
        history.end_frame();
        assert_eq!(history.len(), 2);

        history.begin_frame();
        history.track(block_key(1, 0), Vec2::X);
        history.end_frame();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_motion_blur_strength_scales() {
        assert_eq!(motion_blur_strength(Vec2::ZERO), 0.0);
        assert!((motion_blur_strength(Vec2::new(0.05, 0.0)) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_trail_keeps_newest_first() {
        let mut trail = MotionTrail::new();
        for i in 0..15 {
            trail.record(Vec2::new(i as f32, 0.0));
        }
        assert_eq!(trail.points().len(), MOTION_BLUR_TRAIL);
        assert_eq!(trail.points()[0], Vec2::new(14.0, 0.0));
        assert_eq!(trail.points()[9], Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_trail_uniform_padding() {
        let mut trail = MotionTrail::new();
        trail.record(Vec2::new(1.0, 2.0));
        trail.record(Vec2::new(3.0, 4.0));
        let data = trail.uniform_data();
        assert_eq!(data[0], [3.0, 4.0, 0.0, 0.0]);
        assert_eq!(data[1], [1.0, 2.0, 0.0, 0.0]);
        assert_eq!(data[9], [3.0, 4.0, 0.0, 0.0]);
    }
}
