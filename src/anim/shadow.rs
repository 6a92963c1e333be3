//! Spring-damped "shadow" follower
//!
//! The shadow lags the player and is the shared proximity point for the
//! wall, hole, border and particle effects in the tile shader.

use glam::Vec2;

use crate::consts::{SHADOW_DAMPING, SHADOW_MAX_DT, SHADOW_SPRING};
use crate::ms_to_secs;

#[derive(Debug, Clone, Default)]
pub struct ShadowTracker {
    position: Vec2,
    /// Time of the last update (ms); `None` until the first frame
    last_update: Option<f64>,
}

impl ShadowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Advance toward `target` and return the new shadow position.
    ///
    /// Frame deltas outside (0, 0.1] s (first frame, a suspended tab, a clock
    /// going backwards) snap straight to the target.
    pub fn update(&mut self, target: Vec2, now: f64) -> Vec2 {
        let dt = self.last_update.map(|last| ms_to_secs(now - last));
        self.last_update = Some(now);

        match dt {
            Some(dt) if dt > 0.0 && dt <= SHADOW_MAX_DT => {
                let force = (target - self.position) * SHADOW_SPRING * dt;
                self.position += force * SHADOW_DAMPING;
            }
            _ => self.position = target,
        }
        self.position
    }

    /// Forget history; the next update snaps
    pub fn reset(&mut self) {
        self.last_update = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_update_snaps() {
        let mut shadow = ShadowTracker::new();
        let pos = shadow.update(Vec2::new(3.0, 4.0), 1000.0);
        assert_eq!(pos, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_stall_snaps() {
        let mut shadow = ShadowTracker::new();
        shadow.update(Vec2::ZERO, 0.0);
        // 500 ms gap: no integration
        let pos = shadow.update(Vec2::new(5.0, 0.0), 500.0);
        assert_eq!(pos, Vec2::new(5.0, 0.0));
        // Clock going backwards also snaps
        let pos = shadow.update(Vec2::new(1.0, 1.0), 400.0);
        assert_eq!(pos, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut shadow = ShadowTracker::new();
        shadow.update(Vec2::ZERO, 0.0);
        let target = Vec2::new(10.0, 0.0);
        let initial = target.distance(shadow.position());

        let mut now = 0.0;
        let mut last_distance = initial;
        // 2 seconds at 16 ms per frame
        for _ in 0..125 {
            now += 16.0;
            let pos = shadow.update(target, now);
            let distance = target.distance(pos);
            assert!(distance <= last_distance, "shadow moved away from target");
            assert!(pos.x <= target.x, "shadow overshot");
            last_distance = distance;
        }
        assert!(last_distance < initial * 0.01);
    }

    #[test]
    fn test_single_step_follows_spring() {
        let mut shadow = ShadowTracker::new();
        shadow.update(Vec2::ZERO, 0.0);
        let pos = shadow.update(Vec2::new(1.0, 0.0), 50.0);
        // force = 1 * 3.0 * 0.05 = 0.15, damped by 0.8
        assert!((pos.x - 0.12).abs() < 1e-6);
    }
}
