//! Shader module composition
//!
//! A tile program is the uniform declarations, the built-in vertex stage,
//! and a fragment stage exposing `fs_main(in: VertexOutput)`. Hosts may
//! supply their own fragment stage; the bundled one is used otherwise.

use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::uniforms::UNIFORM_DECLARATIONS;
use crate::error::RenderError;

/// Maps canvas pixels to clip space and forwards the unit-square uv
pub const VERTEX_STAGE: &str = r#"
struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) pixel: vec2<f32>,
}

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) uv: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    let ndc = position / globals.u_resolution * 2.0 - vec2<f32>(1.0, 1.0);
    out.clip = vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
    out.uv = uv;
    out.pixel = position;
    return out;
}
"#;

pub const DEFAULT_FRAGMENT: &str = include_str!("tile_shader.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Full WGSL source for a fragment stage
pub fn compose(fragment: &str) -> String {
    let mut source =
        String::with_capacity(UNIFORM_DECLARATIONS.len() + VERTEX_STAGE.len() + fragment.len() + 2);
    source.push_str(UNIFORM_DECLARATIONS);
    source.push('\n');
    source.push_str(VERTEX_STAGE);
    source.push('\n');
    source.push_str(fragment);
    source
}

/// Bundled program, or the host's fragment stage when one is given
pub fn tile_program(custom_fragment: Option<&str>) -> String {
    compose(custom_fragment.unwrap_or(DEFAULT_FRAGMENT))
}

/// Parse and validate WGSL before it reaches the device.
///
/// wgpu treats an invalid module as a device error, so a host-supplied
/// fragment stage is checked here and rejected with a readable message.
pub fn validate(source: &str) -> Result<(), RenderError> {
    let module = wgsl::parse_str(source)
        .map_err(|err| RenderError::ShaderCompilation(err.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|err| RenderError::ShaderCompilation(err.emit_to_string(source)))?;

    Ok(())
}
