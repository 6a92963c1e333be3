//! Glow Grid - animated tile-puzzle renderer
//!
//! Core modules:
//! - `board`: Read-only game-state snapshots consumed from the game engine
//! - `anim`: Tweens, overlays, shadow follower and particle swarm
//! - `renderer`: Layout, uniforms, draw ordering and the WebGPU/WebGL pipeline
//! - `engine`: The single owner of all animation state, driven by `frame(now)`
//! - `settings`: Persisted user preferences
//! - `web`: Browser host binding (wasm32 only)

pub mod anim;
pub mod board;
pub mod engine;
pub mod error;
pub mod renderer;
pub mod settings;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::rc::Rc;

pub use engine::GridEngine;
pub use error::RenderError;
pub use settings::{QualityPreset, Settings};

/// Animation and physics constants
pub mod consts {
    /// Duration of a normal one-cell move (ms)
    pub const MOVE_DURATION_MS: f64 = 100.0;
    /// Duration of the hole-fill and block-fade overlays (ms)
    pub const HOLE_FADE_DURATION_MS: f64 = 2000.0;

    /// Shadow follower spring constant
    pub const SHADOW_SPRING: f32 = 3.0;
    /// Shadow follower damping applied to each spring step
    pub const SHADOW_DAMPING: f32 = 0.8;
    /// Frame deltas above this (seconds) snap the shadow instead of integrating
    pub const SHADOW_MAX_DT: f32 = 0.1;

    /// Orbiting particle pool size (fixed, matches `u_particles[60]`)
    pub const PARTICLE_COUNT: usize = 60;
    pub const PARTICLE_RINGS: usize = 3;
    pub const PARTICLES_PER_RING: usize = PARTICLE_COUNT / PARTICLE_RINGS;
    /// Radius of the innermost ring, in cell units
    pub const PARTICLE_BASE_RADIUS: f32 = 0.06;
    pub const PARTICLE_RING_SPACING: f32 = 0.03;
    /// Pull toward the player center
    pub const PARTICLE_GRAVITY: f32 = 0.0005;
    /// Pull toward the rotating orbit target
    pub const PARTICLE_ORBIT_STRENGTH: f32 = 0.3;
    pub const PARTICLE_DAMPING: f32 = 0.92;
    pub const PARTICLE_MAX_SPEED: f32 = 0.08;
    /// Largest frame delta (seconds) fed into the orbit angle
    pub const PARTICLE_MAX_DT: f32 = 0.1;

    /// Points in the player's motion blur trail (matches `u_motionBlurTrail[10]`)
    pub const MOTION_BLUR_TRAIL: usize = 10;
    /// Velocity to blur strength gain
    pub const MOTION_BLUR_GAIN: f32 = 8.0;

    /// Player completion shake window (seconds)
    pub const PLAYER_COMPLETE_WINDOW: f32 = 0.6;
    /// Victory overlay length (seconds)
    pub const VICTORY_DURATION: f32 = 5.0;
    pub const VICTORY_FADE_IN: f32 = 0.1;
    pub const VICTORY_FADE_OUT: f32 = 1.0;
}

/// Smoothstep easing: `t²(3 − 2t)` on a clamped `t`
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Milliseconds (animation-frame clock) to seconds
#[inline]
pub fn ms_to_secs(ms: f64) -> f32 {
    (ms / 1000.0) as f32
}

/// Bind a one-shot frame callback to `state` through a `Weak`.
///
/// A cancelled animation frame never runs its callback, so the callback must
/// not be what keeps `state` alive. Runs `frame` only while an owner remains.
pub fn weak_frame<T, F>(state: &Rc<T>, frame: F) -> impl FnOnce(f64) + 'static
where
    T: 'static,
    F: FnOnce(&Rc<T>, f64) + 'static,
{
    let weak = Rc::downgrade(state);
    move |time| {
        if let Some(state) = weak.upgrade() {
            frame(&state, time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-2.0), 0.0);
        assert_eq!(smoothstep(3.0), 1.0);
    }

    #[test]
    fn test_weak_frame_does_not_own_state() {
        let state = Rc::new(Cell::new(0.0));
        let pending = weak_frame(&state, |s, time| s.set(time));
        assert_eq!(Rc::strong_count(&state), 1);

        pending(16.0);
        assert_eq!(state.get(), 16.0);
    }

    #[test]
    fn test_weak_frame_after_owner_dropped_is_noop() {
        let state = Rc::new(Cell::new(0.0));
        let observer = Rc::downgrade(&state);
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let pending = weak_frame(&state, move |_, _| flag.set(true));

        // Dropping the owner frees the state even with a callback outstanding
        drop(state);
        assert!(observer.upgrade().is_none());

        pending(16.0);
        assert!(!ran.get());
    }
}
