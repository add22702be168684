/// Initialization parameters for the device layer.
///
/// Add flags only when a concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Backends the instance may use.
    ///
    /// Defaults to `WGPU_BACKEND` when set, otherwise every backend.
    pub backends: wgpu::Backends,

    pub power_preference: wgpu::PowerPreference,

    /// Force a software adapter. Useful for headless CI runs.
    pub force_fallback_adapter: bool,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features. The deformation kernel needs none.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::from_env().unwrap_or(wgpu::Backends::all()),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl DeviceInit {
    /// Settings for offscreen use (tests, tools): no surface, downlevel limits.
    pub fn headless() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::LowPower,
            required_limits: wgpu::Limits::downlevel_defaults(),
            ..Self::default()
        }
    }
}
