use std::collections::HashSet;

use super::types::{InputEvent, MouseButton, MouseButtonState, PointerButtonEvent, PointerMoveEvent};

/// Current input state for the window.
///
/// Holds the last pointer position (source of movement deltas) and the
/// mouse buttons currently down.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds a platform-agnostic input event into the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Focused(false) => {
                // Avoids stuck buttons when focus changes mid-press.
                self.buttons_down.clear();
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y, .. }) => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::PointerButton(PointerButtonEvent { button, state }) => match state {
                MouseButtonState::Pressed => {
                    self.buttons_down.insert(*button);
                }
                MouseButtonState::Released => {
                    self.buttons_down.remove(button);
                }
            },

            InputEvent::Focused(true) | InputEvent::Key { .. } | InputEvent::MouseWheel { .. } => {}
        }
    }

    /// Movement from the last known pointer position to `(x, y)`.
    pub fn movement_to(&self, x: f32, y: f32) -> (f32, f32) {
        match self.pointer_pos {
            Some((px, py)) => (x - px, y - py),
            None => (0.0, 0.0),
        }
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y, dx: 0.0, dy: 0.0 })
    }

    #[test]
    fn movement_is_relative_to_last_position() {
        let mut s = InputState::default();
        assert_eq!(s.movement_to(10.0, 10.0), (0.0, 0.0));
        s.apply_event(&moved(10.0, 10.0));
        assert_eq!(s.movement_to(13.0, 6.0), (3.0, -4.0));
        s.apply_event(&InputEvent::PointerLeft);
        assert_eq!(s.movement_to(50.0, 50.0), (0.0, 0.0));
    }

    #[test]
    fn focus_loss_clears_held_buttons() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
        }));
        assert!(s.button_down(MouseButton::Left));
        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.button_down(MouseButton::Left));
    }
}
