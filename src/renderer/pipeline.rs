//! WebGPU/WebGL render pipeline for tile draws
//!
//! One shader module, two pipelines that differ only in blending. Each draw
//! in a `FramePlan` gets its own dynamic-offset slot in the per-draw uniform
//! buffer and its own six vertices in the position buffer.

use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use super::frame::{BlendMode, FramePlan};
use super::shader::{self, FRAGMENT_ENTRY, VERTEX_ENTRY};
use super::uniforms::{DrawUniforms, Globals};
use super::vertex::{QUAD_VERTICES, QuadVertex, TexCoord, UNIT_QUAD, quad};
use crate::error::RenderError;

/// Source added onto the destination, scaled by source alpha
const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Draw slots allocated up front; grows by doubling
const INITIAL_DRAW_CAPACITY: usize = 256;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

pub struct GridRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    alpha_pipeline: wgpu::RenderPipeline,
    additive_pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    draw_buffer: wgpu::Buffer,
    position_buffer: wgpu::Buffer,
    texcoord_buffer: wgpu::Buffer,
    /// Bytes between consecutive per-draw uniform slots
    draw_stride: u64,
    /// Draw slots currently allocated in `draw_buffer` and `position_buffer`
    draw_capacity: usize,

    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
}

impl GridRenderState {
    /// Create the device, configure the surface and build both pipelines.
    ///
    /// `fragment` replaces the bundled fragment stage. It is validated before
    /// any GPU object is created from it; an invalid program is fatal.
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        fragment: Option<&str>,
    ) -> Result<Self, RenderError> {
        let source = shader::tile_program(fragment);
        shader::validate(&source)?;
        log::info!("Tile shader validated ({} bytes)", source.len());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("glow-grid-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(|e| RenderError::DeviceCreation(e.to_string()))?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| {
                RenderError::SurfaceCreation("surface is incompatible with the adapter".into())
            })?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tile_shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let draw_stride = align_up(std::mem::size_of::<DrawUniforms>() as u64, alignment);

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_buffer = create_draw_buffer(&device, draw_stride, INITIAL_DRAW_CAPACITY);
        let position_buffer = create_position_buffer(&device, INITIAL_DRAW_CAPACITY);
        let texcoord_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("texcoords"),
            contents: bytemuck::cast_slice(&UNIT_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tile_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<Globals>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<DrawUniforms>() as u64
                        ),
                    },
                    count: None,
                },
            ],
        });
        let bind_group =
            create_bind_group(&device, &bind_group_layout, &globals_buffer, &draw_buffer);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tile_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let alpha_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &module,
            config.format,
            wgpu::BlendState::ALPHA_BLENDING,
            "tile_pipeline_alpha",
        );
        let additive_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &module,
            config.format,
            ADDITIVE_BLENDING,
            "tile_pipeline_additive",
        );
        log::info!("Tile pipelines created (draw stride {} bytes)", draw_stride);

        let size = (config.width, config.height);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            alpha_pipeline,
            additive_pipeline,
            globals_buffer,
            draw_buffer,
            position_buffer,
            texcoord_buffer,
            draw_stride,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            bind_group_layout,
            bind_group,
            size,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure at the current size after the surface was lost
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn ensure_capacity(&mut self, draws: usize) {
        if draws <= self.draw_capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        log::debug!("Growing draw buffers {} -> {}", self.draw_capacity, capacity);
        self.draw_buffer = create_draw_buffer(&self.device, self.draw_stride, capacity);
        self.position_buffer = create_position_buffer(&self.device, capacity);
        self.bind_group = create_bind_group(
            &self.device,
            &self.bind_group_layout,
            &self.globals_buffer,
            &self.draw_buffer,
        );
        self.draw_capacity = capacity;
    }

    /// Upload a frame plan and replay its draws in order
    pub fn render(&mut self, plan: &FramePlan) -> Result<(), wgpu::SurfaceError> {
        let count = plan.draws.len();
        self.ensure_capacity(count);

        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&plan.globals));

        if count > 0 {
            let stride = self.draw_stride as usize;
            let mut slots = vec![0u8; stride * count];
            let mut positions = Vec::with_capacity(count * QUAD_VERTICES);
            for (i, draw) in plan.draws.iter().enumerate() {
                let bytes = bytemuck::bytes_of(&draw.uniforms);
                slots[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
                positions.extend_from_slice(&quad(&draw.rect));
            }
            self.queue.write_buffer(&self.draw_buffer, 0, &slots);
            self.queue
                .write_buffer(&self.position_buffer, 0, bytemuck::cast_slice(&positions));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tile_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tile_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let quad_bytes = (QUAD_VERTICES * std::mem::size_of::<QuadVertex>()) as u64;
            let mut bound: Option<BlendMode> = None;
            render_pass.set_vertex_buffer(1, self.texcoord_buffer.slice(..));

            for (i, draw) in plan.draws.iter().enumerate() {
                if bound != Some(draw.blend) {
                    render_pass.set_pipeline(match draw.blend {
                        BlendMode::Alpha => &self.alpha_pipeline,
                        BlendMode::Additive => &self.additive_pipeline,
                    });
                    bound = Some(draw.blend);
                }
                let offset = i as u64 * self.draw_stride;
                render_pass.set_bind_group(0, &self.bind_group, &[offset as u32]);
                let start = i as u64 * quad_bytes;
                render_pass.set_vertex_buffer(0, self.position_buffer.slice(start..start + quad_bytes));
                render_pass.draw(0..QUAD_VERTICES as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_draw_buffer(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("draw_uniforms"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_position_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("quad_positions"),
        size: (capacity * QUAD_VERTICES * std::mem::size_of::<QuadVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    globals: &wgpu::Buffer,
    draws: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("tile_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: globals.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: draws,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            },
        ],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(VERTEX_ENTRY),
            buffers: &[QuadVertex::desc(), TexCoord::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
