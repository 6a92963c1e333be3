//! Shader uniform contract
//!
//! The tile shader is an opaque program that reads a fixed set of named
//! uniforms. Values shared by every draw in a frame live in `Globals`
//! (binding 0); values that change per draw live in `DrawUniforms`
//! (binding 1, one dynamic-offset slot per draw call).

use bytemuck::{Pod, Zeroable};

use crate::board::TileKind;
use crate::consts::{MOTION_BLUR_TRAIL, PARTICLE_COUNT};

// ============================================================================
// GPU DATA STRUCTURES (must match UNIFORM_DECLARATIONS)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2],         // offset 0
    pub mouse_pos: [f32; 2],          // offset 8
    pub shadow_pos: [f32; 2],         // offset 16
    pub time: f32,                    // offset 24
    pub particle_count: f32,          // offset 28
    pub current_step_count: f32,      // offset 32
    pub goal_step_count: f32,         // offset 36
    pub victory_time: f32,            // offset 40
    pub victory_effect: f32,          // offset 44
    pub particles: [[f32; 4]; PARTICLE_COUNT], // offset 48 (x, y, vx, vy)
    pub motion_blur_trail: [[f32; 4]; MOTION_BLUR_TRAIL], // offset 1008 (.xy used)
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub tile_grid_pos: [f32; 2],    // offset 0
    pub previous_pos: [f32; 2],     // offset 8
    pub current_pos: [f32; 2],      // offset 16
    pub velocity: [f32; 2],         // offset 24
    pub tile_color: [f32; 3],       // offset 32 (vec3, 16-byte aligned)
    pub tile_type: f32,             // offset 44
    pub glow_intensity: f32,        // offset 48
    pub can_move_up: f32,           // offset 52
    pub can_move_down: f32,         // offset 56
    pub can_move_left: f32,         // offset 60
    pub can_move_right: f32,        // offset 64
    pub hole_fill_progress: f32,    // offset 68
    pub random_seed: f32,           // offset 72
    pub trail_step_count: f32,      // offset 76
    pub player_complete_time: f32,  // offset 80
    pub motion_blur_strength: f32,  // offset 84
    pub _pad: [f32; 2],             // pad to 96 bytes (struct align 16)
}

impl DrawUniforms {
    pub fn move_flags(&self) -> [f32; 4] {
        [
            self.can_move_up,
            self.can_move_down,
            self.can_move_left,
            self.can_move_right,
        ]
    }

    pub fn set_move_flags(&mut self, flags: [f32; 4]) {
        let [up, down, left, right] = flags;
        self.can_move_up = up;
        self.can_move_down = down;
        self.can_move_left = left;
        self.can_move_right = right;
    }
}

/// WGSL declaration of the uniform contract, prepended to every shader module
pub const UNIFORM_DECLARATIONS: &str = r#"
struct Globals {
    u_resolution: vec2<f32>,
    u_mousePos: vec2<f32>,
    u_shadowPos: vec2<f32>,
    u_time: f32,
    u_particleCount: f32,
    u_currentStepCount: f32,
    u_goalStepCount: f32,
    u_victoryTime: f32,
    u_victoryEffect: f32,
    u_particles: array<vec4<f32>, 60>,
    u_motionBlurTrail: array<vec4<f32>, 10>,
}

struct DrawUniforms {
    u_tileGridPos: vec2<f32>,
    u_previousPos: vec2<f32>,
    u_currentPos: vec2<f32>,
    u_velocity: vec2<f32>,
    u_tileColor: vec3<f32>,
    u_tileType: f32,
    u_glowIntensity: f32,
    u_canMoveUp: f32,
    u_canMoveDown: f32,
    u_canMoveLeft: f32,
    u_canMoveRight: f32,
    u_holeFillProgress: f32,
    u_randomSeed: f32,
    u_trailStepCount: f32,
    u_playerCompleteTime: f32,
    u_motionBlurStrength: f32,
}

@group(0) @binding(0) var<uniform> globals: Globals;
@group(0) @binding(1) var<uniform> draw: DrawUniforms;
"#;

/// Every uniform name the shader program may reference
pub const UNIFORM_NAMES: &[&str] = &[
    "u_time",
    "u_tileType",
    "u_glowIntensity",
    "u_canMoveUp",
    "u_canMoveDown",
    "u_canMoveLeft",
    "u_canMoveRight",
    "u_holeFillProgress",
    "u_randomSeed",
    "u_currentStepCount",
    "u_goalStepCount",
    "u_trailStepCount",
    "u_victoryTime",
    "u_victoryEffect",
    "u_playerCompleteTime",
    "u_motionBlurStrength",
    "u_particleCount",
    "u_resolution",
    "u_previousPos",
    "u_currentPos",
    "u_tileGridPos",
    "u_mousePos",
    "u_shadowPos",
    "u_velocity",
    "u_tileColor",
    "u_particles",
    "u_motionBlurTrail",
];

/// Colors for tile kinds (linear RGB)
pub mod colors {
    pub const FLOOR: [f32; 3] = [0.08, 0.09, 0.14];
    pub const WALL: [f32; 3] = [0.30, 0.32, 0.42];
    pub const PLAYER: [f32; 3] = [0.10, 0.85, 0.78]; // Teal
    pub const PLAYER_COMPLETE: [f32; 3] = [1.00, 0.80, 0.25]; // Gold
    pub const EXIT: [f32; 3] = [0.25, 0.90, 0.45];
    pub const BLOCK: [f32; 3] = [0.95, 0.55, 0.20];
    pub const BLOCK_HORIZONTAL: [f32; 3] = [0.95, 0.35, 0.45];
    pub const BLOCK_VERTICAL: [f32; 3] = [0.55, 0.45, 0.95];
    pub const BLOCK_DIRECTIONAL: [f32; 3] = [0.90, 0.75, 0.30];
    pub const HOLE: [f32; 3] = [0.12, 0.02, 0.20];
}

/// Base color for a tile kind
pub fn tile_color(kind: TileKind) -> [f32; 3] {
    match kind {
        TileKind::Default => colors::FLOOR,
        TileKind::Wall => colors::WALL,
        TileKind::Player | TileKind::PlayerOnExit => colors::PLAYER,
        TileKind::Exit => colors::EXIT,
        TileKind::Block => colors::BLOCK,
        TileKind::BlockHorizontal => colors::BLOCK_HORIZONTAL,
        TileKind::BlockVertical => colors::BLOCK_VERTICAL,
        TileKind::BlockUp | TileKind::BlockDown | TileKind::BlockLeft | TileKind::BlockRight => {
            colors::BLOCK_DIRECTIONAL
        }
        TileKind::Hole => colors::HOLE,
    }
}

/// Player color: gold once the game reports completion, teal otherwise
pub fn player_color(complete: bool) -> [f32; 3] {
    if complete {
        colors::PLAYER_COMPLETE
    } else {
        colors::PLAYER
    }
}
