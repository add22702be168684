//! Morph engine crate.
//!
//! GPU mesh deformation: a device context, a canonical mesh store, a compute
//! transform engine and a viewport that draws its output, plus the winit
//! runtime that hosts them in a window.

pub mod device;
pub mod error;
pub mod mesh;
pub mod transform;
pub mod render;
pub mod session;

pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;

pub use error::{EngineError, Result};
pub use session::MorphSession;
