use winit::dpi::PhysicalSize;

use crate::device::{DeviceContext, SurfaceErrorAction, SurfaceTarget};
use crate::error::{EngineError, Result};
use crate::input::InputEvent;
use crate::mesh::VERTEX_STRIDE;

use super::{row_major, CameraState, DepthTarget};

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.09,
    b: 0.11,
    a: 1.0,
};

const CAMERA_UNIFORM_SIZE: u64 = 64;

/// Result of one `Viewport::render` tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// A frame was drawn and presented.
    Presented,
    /// Nothing to draw yet: zero-area surface or no mesh buffers.
    Idle,
    /// The swapchain asked to skip this frame (or was reconfigured).
    Skipped,
}

struct IndexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

/// Draw-side counterpart of the transform engine.
///
/// Owns the mesh pipeline, camera uniform, depth attachment and the draw-time
/// vertex/index buffers. Each buffer slot holds at most one live buffer; a
/// replacement destroys the old one first.
pub struct Viewport {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    depth: Option<DepthTarget>,
    vertices: Option<wgpu::Buffer>,
    indices: Option<IndexBuffer>,

    camera: CameraState,
    size: PhysicalSize<u32>,
}

impl Viewport {
    pub fn new(ctx: &DeviceContext, color_format: wgpu::TextureFormat) -> Result<Self> {
        let device = ctx.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("morph mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("morph camera bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(CAMERA_UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let camera_buffer = ctx.create_buffer(
            "morph camera ubo",
            CAMERA_UNIFORM_SIZE,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            Some(bytemuck::cast_slice(&row_major(&glam::Mat4::IDENTITY))),
        )?;

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("morph camera bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("morph mesh pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("morph mesh pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_STRIDE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthTarget::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            depth: None,
            vertices: None,
            indices: None,
            camera: CameraState::default(),
            size: PhysicalSize::new(0, 0),
        })
    }

    /// Applies `size` to the swapchain and resizes the depth attachment.
    ///
    /// Zero-area sizes are recorded; nothing is drawn until a non-zero resize.
    pub fn configure_surface(&mut self, ctx: &DeviceContext, surface: &mut SurfaceTarget<'_>, size: PhysicalSize<u32>) {
        surface.resize(ctx, size);
        self.resize(ctx, size.width, size.height);
    }

    /// Resizes the depth attachment; a zero dimension releases it.
    pub fn resize(&mut self, ctx: &DeviceContext, width: u32, height: u32) {
        self.size = PhysicalSize::new(width, height);

        if let Some(depth) = &self.depth {
            if depth.size() == (width, height) {
                return;
            }
        }
        if let Some(old) = self.depth.take() {
            old.release();
        }
        if width > 0 && height > 0 {
            self.depth = Some(DepthTarget::new(ctx.device(), width, height));
            log::debug!("viewport depth target {width}x{height}");
        }
    }

    /// Replaces the draw-time positions.
    ///
    /// Writes in place when the byte size matches the current vertex buffer,
    /// otherwise recreates it.
    pub fn update_mesh(&mut self, ctx: &DeviceContext, positions: &[f32]) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(positions);
        let size = bytes.len() as u64;

        if let Some(buffer) = &self.vertices {
            if buffer.size() == size {
                ctx.write_buffer(buffer, 0, bytes);
                return Ok(());
            }
        }
        if let Some(old) = self.vertices.take() {
            old.destroy();
        }
        if size == 0 {
            return Ok(());
        }

        self.vertices = Some(ctx.create_buffer(
            "morph mesh vertices",
            size,
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            Some(bytes),
        )?);
        Ok(())
    }

    /// Creates the index buffer unless one already exists.
    ///
    /// Topology never changes across deformations; only [`replace_indices`](Self::replace_indices)
    /// swaps it.
    pub fn ensure_indices(&mut self, ctx: &DeviceContext, indices: &[u32]) -> Result<()> {
        if self.indices.is_some() || indices.is_empty() {
            return Ok(());
        }
        let bytes: &[u8] = bytemuck::cast_slice(indices);
        let buffer = ctx.create_buffer(
            "morph mesh indices",
            bytes.len() as u64,
            wgpu::BufferUsages::INDEX,
            Some(bytes),
        )?;
        self.indices = Some(IndexBuffer {
            buffer,
            count: indices.len() as u32,
        });
        Ok(())
    }

    /// Releases the index buffer and rebuilds it from `indices` (mesh reset).
    pub fn replace_indices(&mut self, ctx: &DeviceContext, indices: &[u32]) -> Result<()> {
        if let Some(old) = self.indices.take() {
            old.buffer.destroy();
        }
        self.ensure_indices(ctx, indices)
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.camera.handle_input(event)
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Depth, vertex and index buffers all exist.
    pub fn is_drawable(&self) -> bool {
        self.depth.is_some() && self.vertices.is_some() && self.indices.is_some()
    }

    /// Draws into the next swapchain texture and presents it.
    pub fn render(&mut self, ctx: &DeviceContext, surface: &mut SurfaceTarget<'_>) -> Result<FrameOutcome> {
        if !self.is_drawable() || !surface.has_area() {
            return Ok(FrameOutcome::Idle);
        }

        let frame = match surface.acquire_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match surface.handle_error(ctx, err.clone()) {
                    SurfaceErrorAction::Fatal => Err(EngineError::Surface(err)),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(FrameOutcome::Skipped),
                };
            }
        };

        self.render_to(ctx, &frame.view)?;
        surface.present(frame);
        Ok(FrameOutcome::Presented)
    }

    /// Records and submits one frame into `target`.
    ///
    /// Returns `false` without touching the device when there is nothing to draw.
    /// `target` must match the pipeline's color format and the current size.
    pub fn render_to(&self, ctx: &DeviceContext, target: &wgpu::TextureView) -> Result<bool> {
        let (Some(depth), Some(vertices), Some(indices)) = (&self.depth, &self.vertices, &self.indices) else {
            return Ok(false);
        };
        ctx.ensure_alive()?;

        let aspect = self.size.width as f32 / self.size.height as f32;
        let mvp = self.camera.view_projection(aspect);
        ctx.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&row_major(&mvp)));

        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("morph frame encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("morph mesh pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_vertex_buffer(0, vertices.slice(..));
            pass.set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..indices.count, 0, 0..1);
        }

        ctx.queue().submit(std::iter::once(encoder.finish()));
        Ok(true)
    }
}
