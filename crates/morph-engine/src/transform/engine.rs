use crate::device::DeviceContext;
use crate::error::{EngineError, Result};
use crate::mesh::{Mesh, VERTEX_STRIDE};

use super::{OperationParams, OperationRequest};

/// Invocations per workgroup; must match `@workgroup_size` in the kernel.
pub const WORKGROUP_SIZE: u32 = 64;

/// Workgroups needed to cover `vertex_count` vertices along X.
#[inline]
pub fn workgroup_count(vertex_count: u32) -> u32 {
    vertex_count.div_ceil(WORKGROUP_SIZE)
}

/// Device buffers sized against one mesh, plus the bind group over them.
struct DeformBuffers {
    input: wgpu::Buffer,
    output: wgpu::Buffer,
    params: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_count: u32,
}

impl DeformBuffers {
    fn positions_size(&self) -> u64 {
        self.vertex_count as u64 * VERTEX_STRIDE
    }

    fn release(self) {
        self.input.destroy();
        self.output.destroy();
        self.params.destroy();
    }
}

/// Compute-driven mesh deformation.
///
/// Owns the kernel pipeline and exactly one input/output/parameter buffer set.
/// Each `apply` is synchronous to the caller and asynchronous to the device;
/// callers must not start a second `apply` before the previous result has been
/// fetched (`&mut self` on the session enforces this).
pub struct TransformEngine {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    buffers: Option<DeformBuffers>,
}

impl TransformEngine {
    /// Compiles the deformation kernel. Buffers are allocated by [`initialize`](Self::initialize).
    pub fn new(ctx: &DeviceContext) -> Self {
        let device = ctx.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("morph deform shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/deform.wgsl").into()),
        });

        let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(VERTEX_STRIDE),
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("morph deform bgl"),
            entries: &[
                storage(0, true),
                storage(1, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(OperationParams::SIZE),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("morph deform pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("morph deform pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            buffers: None,
        }
    }

    /// (Re)allocates the buffers for `mesh` and uploads its positions.
    ///
    /// Must run again whenever the vertex count changes. The previous buffer set
    /// is released before the new one is allocated.
    pub fn initialize(&mut self, ctx: &DeviceContext, mesh: &Mesh) -> Result<()> {
        if let Some(old) = self.buffers.take() {
            old.release();
        }

        let vertex_count = mesh.vertex_count();
        let size = mesh.positions_size().max(VERTEX_STRIDE);
        let mut contents = bytemuck::cast_slice::<f32, u8>(mesh.positions()).to_vec();
        contents.resize(size as usize, 0);

        let input = ctx.create_buffer(
            "morph deform input",
            size,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            Some(&contents),
        )?;
        let output = ctx.create_buffer(
            "morph deform output",
            size,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            None,
        )?;
        let params = ctx.create_buffer(
            "morph deform params",
            OperationParams::SIZE,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            None,
        )?;

        let bind_group = ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("morph deform bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        });

        log::debug!("transform engine initialized for {vertex_count} vertices");
        self.buffers = Some(DeformBuffers {
            input,
            output,
            params,
            bind_group,
            vertex_count,
        });
        Ok(())
    }

    /// Overwrites the input positions (e.g. with the previous pass's result).
    pub fn upload(&self, ctx: &DeviceContext, positions: &[f32]) -> Result<()> {
        let buffers = self.ready()?;
        let actual = (positions.len() * std::mem::size_of::<f32>()) as u64;
        if actual != buffers.positions_size() {
            return Err(EngineError::SizeMismatch {
                expected: buffers.positions_size(),
                actual,
            });
        }
        ctx.write_buffer(&buffers.input, 0, bytemuck::cast_slice(positions));
        Ok(())
    }

    /// Runs one deformation pass; returns the submit-to-completion time in ms.
    pub async fn apply(&self, ctx: &DeviceContext, request: OperationRequest) -> Result<f64> {
        let buffers = self.ready()?;

        let params = OperationParams::encode(request, buffers.vertex_count);
        ctx.write_buffer(&buffers.params, 0, bytemuck::bytes_of(&params));

        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("morph deform encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("morph deform pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &buffers.bind_group, &[]);
            pass.dispatch_workgroups(workgroup_count(buffers.vertex_count), 1, 1);
        }

        let elapsed = ctx.submit_and_wait(encoder.finish()).await?;
        Ok(elapsed.as_secs_f64() * 1000.0)
    }

    /// Reads the output positions back; same length and layout as the input.
    pub async fn fetch_result(&self, ctx: &DeviceContext) -> Result<Vec<f32>> {
        let buffers = self.ready()?;
        if buffers.vertex_count == 0 {
            return Ok(Vec::new());
        }
        let bytes = ctx.read_buffer(&buffers.output, buffers.positions_size()).await?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    /// Vertex count the buffers are sized for (0 before `initialize`).
    pub fn vertex_count(&self) -> u32 {
        self.buffers.as_ref().map_or(0, |b| b.vertex_count)
    }

    pub fn is_ready(&self) -> bool {
        self.buffers.is_some()
    }

    fn ready(&self) -> Result<&DeformBuffers> {
        self.buffers
            .as_ref()
            .ok_or(EngineError::BindGroupNotReady("transform engine buffers"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_partial_workgroups() {
        assert_eq!(workgroup_count(0), 0);
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(8), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
        assert_eq!(workgroup_count(130), 3);
    }
}
