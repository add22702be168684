use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

use crate::input::{
    InputEvent, InputState, Key, KeyState, MouseButton, MouseButtonState, MouseWheelDelta,
    PointerButtonEvent, PointerMoveEvent,
};

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Returns `None` for events not represented by the input subsystem.
pub(crate) fn translate_window_event(
    window: &Window,
    state: &InputState,
    event: &WindowEvent,
) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical_f32(window, *position);
            let (dx, dy) = state.movement_to(x, y);
            Some(InputEvent::PointerMoved(PointerMoveEvent { x, y, dx, dy }))
        }

        WindowEvent::MouseInput { state: st, button, .. } => {
            let state = match st {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            };
            Some(InputEvent::PointerButton(PointerButtonEvent {
                button: map_mouse_button(*button),
                state,
            }))
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x: *x, y: *y },
                MouseScrollDelta::PixelDelta(p) => {
                    let (x, y) = to_logical_f32(window, *p);
                    MouseWheelDelta::Pixel { x, y }
                }
            };
            Some(InputEvent::MouseWheel { delta })
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };
            Some(InputEvent::Key {
                key: map_key(event.physical_key),
                state,
                repeat: event.repeat,
            })
        }

        _ => None,
    }
}

fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    (logical.x as f32, logical.y as f32)
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(code) => match code {
            KeyCode::Escape => Key::Escape,
            KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
            KeyCode::Space => Key::Space,
            KeyCode::ArrowUp => Key::ArrowUp,
            KeyCode::ArrowDown => Key::ArrowDown,
            KeyCode::KeyR => Key::R,
            KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit1,
            KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit2,
            KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit3,
            KeyCode::Digit4 | KeyCode::Numpad4 => Key::Digit4,
            other => Key::Unknown(other as u32),
        },
        // NativeKeyCode has no stable numeric form in winit 0.30.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}
