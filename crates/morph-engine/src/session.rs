//! Host-facing session.
//!
//! Wires the device, mesh store, transform engine and viewport together behind
//! the handful of operations a UI layer calls: `reset`, `process`,
//! `vertex_count` and the per-frame `render`.

use winit::dpi::PhysicalSize;

use crate::device::{DeviceContext, SurfaceTarget};
use crate::error::{EngineError, Result};
use crate::input::InputEvent;
use crate::mesh::{Mesh, MeshStore};
use crate::render::{FrameOutcome, Viewport};
use crate::transform::{OperationRequest, TransformEngine};

pub struct MorphSession {
    ctx: DeviceContext,
    store: MeshStore,
    engine: TransformEngine,
    viewport: Viewport,

    /// Mesh as currently displayed; deformations accumulate on it.
    current: Mesh,
}

impl MorphSession {
    /// Builds the pipelines and uploads a fresh cube.
    ///
    /// `color_format` is the format of the targets passed to `render`/`render_to`.
    pub fn new(ctx: DeviceContext, color_format: wgpu::TextureFormat) -> Result<Self> {
        let store = MeshStore::new();
        let current = store.mesh().clone();

        let mut engine = TransformEngine::new(&ctx);
        engine.initialize(&ctx, &current)?;

        let mut viewport = Viewport::new(&ctx, color_format)?;
        viewport.update_mesh(&ctx, current.positions())?;
        viewport.ensure_indices(&ctx, current.indices())?;

        log::info!(
            "session ready: {} vertices, {} triangles",
            current.vertex_count(),
            current.triangle_count()
        );

        Ok(Self {
            ctx,
            store,
            engine,
            viewport,
            current,
        })
    }

    /// Restores the undeformed cube and rebuilds every buffer sized against it.
    pub fn reset(&mut self) -> Result<()> {
        let mesh = self.store.reset();
        self.engine.initialize(&self.ctx, mesh)?;
        self.viewport.update_mesh(&self.ctx, mesh.positions())?;
        self.viewport.replace_indices(&self.ctx, mesh.indices())?;
        self.current = mesh.clone();
        log::info!("mesh reset ({} vertices)", self.current.vertex_count());
        Ok(())
    }

    /// Applies operation `name` (`scale`, `rotate`, `translate`, `inflate`) to the
    /// current mesh. Unknown names fall back to scale.
    ///
    /// Returns the device time of the deformation pass in milliseconds.
    pub async fn process(&mut self, name: &str, param: f32) -> Result<f64> {
        self.apply(OperationRequest::from_name(name, param)).await
    }

    /// Runs one deformation pass over the current mesh.
    ///
    /// On any failure the current mesh and draw buffers are left untouched.
    pub async fn apply(&mut self, request: OperationRequest) -> Result<f64> {
        self.engine.upload(&self.ctx, self.current.positions())?;
        let elapsed_ms = self.engine.apply(&self.ctx, request).await?;
        let positions = self.engine.fetch_result(&self.ctx).await?;

        let expected = self.current.positions_size();
        let actual = (positions.len() * std::mem::size_of::<f32>()) as u64;
        let next = self
            .current
            .with_positions(positions)
            .ok_or(EngineError::SizeMismatch { expected, actual })?;

        self.viewport.update_mesh(&self.ctx, next.positions())?;
        self.current = next;

        log::debug!(
            "{} ({}) took {elapsed_ms:.3} ms",
            request.operation,
            request.param
        );
        Ok(elapsed_ms)
    }

    pub fn vertex_count(&self) -> u32 {
        self.current.vertex_count()
    }

    /// Current (possibly deformed) positions, flat xyz triples.
    pub fn positions(&self) -> &[f32] {
        self.current.positions()
    }

    /// Per-frame tick: draws the current mesh into `surface` and presents it.
    pub fn render(&mut self, surface: &mut SurfaceTarget<'_>) -> Result<FrameOutcome> {
        self.viewport.render(&self.ctx, surface)
    }

    /// Draws into an arbitrary view of the session's color format.
    pub fn render_to(&self, target: &wgpu::TextureView) -> Result<bool> {
        self.viewport.render_to(&self.ctx, target)
    }

    pub fn configure_surface(&mut self, surface: &mut SurfaceTarget<'_>, size: PhysicalSize<u32>) {
        self.viewport.configure_surface(&self.ctx, surface, size);
    }

    /// Resizes offscreen rendering; zero area turns `render_to` into a no-op.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(&self.ctx, width, height);
    }

    /// Routes orbit/zoom input to the camera. Returns whether it changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.viewport.handle_input(event)
    }

    pub fn device(&self) -> &DeviceContext {
        &self.ctx
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}
