/// Keyboard key identifier.
///
/// Only the keys the studio binds are named; everything else maps to
/// `Key::Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,

    ArrowUp,
    ArrowDown,

    R,

    Digit1,
    Digit2,
    Digit3,
    Digit4,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    /// Primary or secondary button; either starts an orbit drag.
    #[inline]
    pub fn is_orbit_button(self) -> bool {
        matches!(self, MouseButton::Left | MouseButton::Right)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Mouse wheel delta, winit sign convention (+Y scrolls up / away from the user).
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    #[inline]
    pub fn y(self) -> f32 {
        match self {
            MouseWheelDelta::Line { y, .. } | MouseWheelDelta::Pixel { y, .. } => y,
        }
    }
}

/// Pointer move event in logical pixels.
///
/// `dx`/`dy` are the movement since the previous move event (0 for the first
/// event after the pointer enters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    PointerMoved(PointerMoveEvent),
    PointerButton(PointerButtonEvent),

    MouseWheel { delta: MouseWheelDelta },

    /// Pointer left the window surface.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}

impl InputEvent {
    /// Returns the key for a fresh (non-repeat) press.
    pub fn key_pressed(&self) -> Option<Key> {
        match self {
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                repeat: false,
            } => Some(*key),
            _ => None,
        }
    }
}
