//! Quad vertex data for tile draws
//!
//! Each draw is two triangles (6 vertices). Positions are canvas pixels and
//! are re-uploaded every frame; texture coordinates are a fixed unit square
//! in their own buffer.

use bytemuck::{Pod, Zeroable};

use super::layout::Rect;

pub const QUAD_VERTICES: usize = 6;

/// Canvas-pixel position (top-left origin)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

/// Unit-square texture coordinate
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TexCoord {
    pub uv: [f32; 2],
}

/// Fixed texture coordinates, same winding as `quad`
pub const UNIT_QUAD: [TexCoord; QUAD_VERTICES] = [
    TexCoord { uv: [0.0, 0.0] },
    TexCoord { uv: [1.0, 0.0] },
    TexCoord { uv: [0.0, 1.0] },
    TexCoord { uv: [0.0, 1.0] },
    TexCoord { uv: [1.0, 0.0] },
    TexCoord { uv: [1.0, 1.0] },
];

/// Two triangles covering `rect`
pub fn quad(rect: &Rect) -> [QuadVertex; QUAD_VERTICES] {
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.x + rect.w, rect.y + rect.h);
    let v = |x: f32, y: f32| QuadVertex { position: [x, y] };
    [
        v(x0, y0),
        v(x1, y0),
        v(x0, y1),
        v(x0, y1),
        v(x1, y0),
        v(x1, y1),
    ]
}

impl QuadVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

impl TexCoord {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TexCoord>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}
