//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, and wires them to the session.

mod runtime;

pub use runtime::{LoopState, Runtime, RuntimeConfig, RuntimeEvent};
