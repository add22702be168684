use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::{EngineError, Result};

use super::{DeviceContext, DeviceInit, SurfaceErrorAction, SurfaceFrame};

/// A window surface plus its active configuration.
///
/// The surface is created before the adapter (so adapter selection can require
/// compatibility) and configured once a device exists. A zero-area size is
/// recorded but never applied to the swapchain; wgpu rejects 0x0 configurations.
pub struct SurfaceTarget<'w> {
    /// Surface lifetime is tied to the window via `'w`.
    surface: wgpu::Surface<'w>,

    config: Option<wgpu::SurfaceConfiguration>,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl<'w> SurfaceTarget<'w> {
    pub fn new(instance: &wgpu::Instance, window: &'w Window) -> Result<Self> {
        let surface = instance.create_surface(window)?;
        Ok(Self {
            surface,
            config: None,
            size: window.inner_size(),
        })
    }

    pub fn surface(&self) -> &wgpu::Surface<'w> {
        &self.surface
    }

    /// Picks a format and alpha mode for `ctx`'s adapter and configures the swapchain.
    pub fn configure(&mut self, ctx: &DeviceContext, init: &DeviceInit) -> Result<wgpu::TextureFormat> {
        let caps = self.surface.get_capabilities(ctx.adapter());
        let format =
            choose_surface_format(&caps, init.prefer_srgb).ok_or(EngineError::SurfaceUnsupported)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: self.size.width.max(1),
            height: self.size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        if self.has_area() {
            self.surface.configure(ctx.device(), &config);
        }
        self.config = Some(config);

        log::debug!("surface configured: {format:?} {}x{}", self.size.width, self.size.height);
        Ok(format)
    }

    pub fn has_area(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// Reconfigures after a resize.
    ///
    /// A zero dimension only updates the recorded size. Returns whether the
    /// swapchain was reconfigured.
    pub fn resize(&mut self, ctx: &DeviceContext, new_size: PhysicalSize<u32>) -> bool {
        self.size = new_size;
        if !self.has_area() {
            return false;
        }

        let Some(config) = self.config.as_mut() else { return false };
        config.width = new_size.width;
        config.height = new_size.height;
        self.surface.configure(ctx.device(), config);
        true
    }

    /// Acquires the next swapchain texture.
    pub fn acquire_frame(&self) -> std::result::Result<SurfaceFrame, wgpu::SurfaceError> {
        let texture = self.surface.get_current_texture()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(SurfaceFrame { texture, view })
    }

    /// Presents a frame whose commands have been submitted.
    pub fn present(&self, frame: SurfaceFrame) {
        let SurfaceFrame { texture, view } = frame;
        drop(view);
        texture.present();
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_error(&mut self, ctx: &DeviceContext, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                if let (true, Some(config)) = (self.has_area(), self.config.as_ref()) {
                    self.surface.configure(ctx.device(), config);
                }
                log::debug!("surface {err:?}; reconfigured");
                SurfaceErrorAction::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => {
                log::debug!("surface {err:?}; skipping frame");
                SurfaceErrorAction::SkipFrame
            }
        }
    }
}

fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let srgb = caps.formats.iter().copied().find(|f| f.is_srgb());
    match srgb {
        Some(f) if prefer_srgb => Some(f),
        _ => caps.formats.first().copied(),
    }
}

fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>, alpha: Vec<wgpu::CompositeAlphaMode>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            alpha_modes: alpha,
            ..Default::default()
        }
    }

    #[test]
    fn prefers_srgb_when_requested() {
        let c = caps(
            vec![wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Bgra8UnormSrgb],
            vec![],
        );
        assert_eq!(choose_surface_format(&c, true), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(wgpu::TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn no_formats_means_unsupported() {
        assert_eq!(choose_surface_format(&caps(vec![], vec![]), true), None);
    }

    #[test]
    fn unsupported_alpha_request_falls_back() {
        let c = caps(vec![], vec![wgpu::CompositeAlphaMode::Opaque]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
        assert_eq!(choose_alpha_mode(&caps(vec![], vec![]), None), wgpu::CompositeAlphaMode::Auto);
    }
}
