use crate::device::DeviceLost;
use crate::input::InputEvent;
use crate::session::MorphSession;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the host.
///
/// The runtime owns the window, surface and session; callbacks receive the
/// session by reference and never outlive the call.
pub trait App {
    /// Called once after the session is created, before the first frame.
    fn on_start(&mut self, session: &mut MorphSession) -> AppControl {
        let _ = session;
        AppControl::Continue
    }

    /// Called for every translated input event, after the camera has seen it.
    fn on_input(&mut self, session: &mut MorphSession, event: &InputEvent) -> AppControl {
        let _ = (session, event);
        AppControl::Continue
    }

    /// Called once per frame while the render loop runs.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        ctx.render()
    }

    /// Called once when the device is lost. The render loop is already stopped.
    fn on_device_lost(&mut self, lost: &DeviceLost) {
        let _ = lost;
    }
}
