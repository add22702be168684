//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue and observing device loss
//! - allocating device buffers and reading them back through staging buffers
//! - creating & configuring the window Surface (swapchain)

mod context;
mod frame;
mod init;
mod surface;

pub use context::{DeviceContext, DeviceLost};
pub use frame::{SurfaceErrorAction, SurfaceFrame};
pub use init::DeviceInit;
pub use surface::SurfaceTarget;
