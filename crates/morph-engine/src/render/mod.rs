//! Mesh rendering.
//!
//! `Viewport` owns the draw pipeline and its buffers; `CameraState` turns
//! orbit input into the model-view-projection matrix uploaded each frame.

mod camera;
mod depth;
mod viewport;

pub use camera::{row_major, CameraState, FOV_Y, ORBIT_SENSITIVITY, ZOOM_MAX, ZOOM_MIN, Z_FAR, Z_NEAR};
pub use depth::DepthTarget;
pub use viewport::{FrameOutcome, Viewport, CLEAR_COLOR};
