//! Tile rendering
//!
//! Everything up to `FramePlan` is CPU-side and GPU-free; `pipeline` replays
//! a plan through wgpu (WebGPU, or WebGL2 where that is all the browser has).

pub mod builder;
pub mod frame;
pub mod layout;
pub mod pipeline;
pub mod shader;
pub mod uniforms;
pub mod vertex;

pub use builder::UniformBuilder;
pub use frame::{BlendMode, DrawCall, DrawStage, FramePlan, PlayerSample};
pub use layout::{GridLayout, Rect};
pub use pipeline::GridRenderState;
pub use uniforms::{DrawUniforms, Globals};
