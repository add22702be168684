//! Frame timing.
//!
//! One `FrameClock` per render loop; `tick()` once per rendered frame.

mod frame_clock;

pub use frame_clock::{FpsMeter, FrameClock, FrameTime};
