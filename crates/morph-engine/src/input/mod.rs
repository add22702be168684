//! Input events and held-state tracking.
//!
//! `InputEvent` is independent of winit; `platform::winit` does the translation
//! and fills in pointer movement deltas from `InputState`.

pub(crate) mod platform;
mod state;
mod types;

pub use state::InputState;
pub use types::{
    InputEvent, Key, KeyState, MouseButton, MouseButtonState, MouseWheelDelta, PointerButtonEvent,
    PointerMoveEvent,
};
