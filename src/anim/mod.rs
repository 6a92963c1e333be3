//! Animation state
//!
//! Everything here is plain data driven by explicit timestamps (ms on the
//! animation-frame clock). No module reads a clock or touches the GPU.

pub mod effects;
pub mod history;
pub mod key;
pub mod matching;
pub mod particles;
pub mod registry;
pub mod shadow;
pub mod tween;

pub use effects::{PlayerEffects, VictoryEffect, VictoryTracker};
pub use history::{MotionTrail, PositionHistory, motion_blur_strength};
pub use key::{FloatingKey, OverlayKey, TrackKey, TweenKey};
pub use matching::find_vacated_source;
pub use particles::{Particle, ParticleSwarm};
pub use registry::{AnimationRegistry, FloatingSample, ScheduleReport};
pub use shadow::ShadowTracker;
pub use tween::{FloatingBlock, Overlay, Tween};
