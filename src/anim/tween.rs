//! Time-stamped tweens and overlays
//!
//! Progress is always a pure function of `(now - start) / duration`, so
//! re-querying at the same time returns the same answer no matter how often
//! a frame asks.

use glam::Vec2;

use crate::board::TileKind;
use crate::smoothstep;

/// Linear progress clamped to [0, 1]. Zero-length spans are complete immediately.
#[inline]
pub fn progress(start_time: f64, duration: f64, now: f64) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    ((now - start_time) / duration).clamp(0.0, 1.0) as f32
}

/// Position interpolation between two grid positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub start_pos: Vec2,
    pub target_pos: Vec2,
    pub start_time: f64,
    pub duration: f64,
}

impl Tween {
    pub fn new(start_pos: Vec2, target_pos: Vec2, start_time: f64, duration: f64) -> Self {
        Self {
            start_pos,
            target_pos,
            start_time,
            duration,
        }
    }

    pub fn progress(&self, now: f64) -> f32 {
        progress(self.start_time, self.duration, now)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Smoothstep-eased position; exactly `target_pos` once finished
    pub fn position(&self, now: f64) -> Vec2 {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.target_pos;
        }
        self.start_pos.lerp(self.target_pos, smoothstep(t))
    }
}

/// A fade effect decoupled from board occupancy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub start_time: f64,
    pub duration: f64,
    /// Block drawn by the overlay, if any
    pub block_type: Option<TileKind>,
}

impl Overlay {
    pub fn progress(&self, now: f64) -> f32 {
        progress(self.start_time, self.duration, now)
    }

    /// Scheduled but not yet begun (start offset into the future)
    pub fn is_pending(&self, now: f64) -> bool {
        now < self.start_time
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

/// A block drawn once on top of the board while it slides between cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingBlock {
    pub block_type: TileKind,
    pub tween: Tween,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tween_endpoints() {
        let tween = Tween::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 2.0), 1000.0, 100.0);
        assert_eq!(tween.position(1000.0), Vec2::new(0.0, 0.0));
        assert_eq!(tween.position(900.0), Vec2::new(0.0, 0.0));
        assert_eq!(tween.position(1100.0), Vec2::new(1.0, 2.0));
        assert_eq!(tween.position(5000.0), Vec2::new(1.0, 2.0));
        let mid = tween.position(1050.0);
        assert!((mid.x - 0.5).abs() < 1e-6);
        assert!((mid.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_duration_is_complete() {
        assert_eq!(progress(10.0, 0.0, 10.0), 1.0);
    }

    #[test]
    fn test_overlay_pending_until_start() {
        let overlay = Overlay {
            start_time: 200.0,
            duration: 2000.0,
            block_type: None,
        };
        assert!(overlay.is_pending(100.0));
        assert_eq!(overlay.progress(100.0), 0.0);
        assert!(!overlay.is_pending(200.0));
        assert!(overlay.is_finished(2200.0));
    }

    proptest! {
        #[test]
        fn prop_progress_monotonic_and_idempotent(
            start in -1.0e4f64..1.0e4,
            duration in 1.0f64..5000.0,
            a in -2.0e4f64..2.0e4,
            delta in 0.0f64..1.0e4,
        ) {
            let p1 = progress(start, duration, a);
            let p2 = progress(start, duration, a + delta);
            prop_assert!((0.0..=1.0).contains(&p1));
            prop_assert!(p2 >= p1);
            prop_assert_eq!(p1, progress(start, duration, a));
        }
    }
}
