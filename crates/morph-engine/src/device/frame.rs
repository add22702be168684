/// One acquired swapchain image and its view.
///
/// Hold it only for the duration of a frame; the next `acquire_frame` blocks
/// until it has been presented through [`SurfaceTarget::present`](super::SurfaceTarget::present).
pub struct SurfaceFrame {
    pub texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

/// What the caller should do after `SurfaceTarget::handle_error`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Lost/outdated swapchain was reconfigured; draw again next frame.
    Reconfigured,
    /// Timeout or transient failure; drop this frame.
    SkipFrame,
    /// Out of memory; the window cannot present any more.
    Fatal,
}
