use winit::window::Window;

use crate::device::SurfaceTarget;
use crate::error::EngineError;
use crate::render::FrameOutcome;
use crate::session::MorphSession;

use super::app::AppControl;

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `SurfaceTarget<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub surface: &'a mut SurfaceTarget<'w>,
    pub session: &'a mut MorphSession,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Draws the session's mesh and presents it.
    ///
    /// Device loss is left to the runtime's loss notification; other fatal
    /// surface errors end the app.
    pub fn render(&mut self) -> AppControl {
        self.window.pre_present_notify();
        match self.session.render(self.surface) {
            Ok(FrameOutcome::Presented | FrameOutcome::Idle | FrameOutcome::Skipped) => AppControl::Continue,
            Err(EngineError::DeviceLost { .. }) => AppControl::Continue,
            Err(e) if e.is_fatal() => {
                log::error!("render failed: {e}");
                AppControl::Exit
            }
            Err(e) => {
                log::warn!("frame dropped: {e}");
                AppControl::Continue
            }
        }
    }
}
