use morph_engine::input::Key;
use morph_engine::transform::{Operation, OperationRequest};

pub const PARAM_MIN: f32 = 0.0;
pub const PARAM_MAX: f32 = 2.0;
pub const PARAM_STEP: f32 = 0.1;

/// What a key press asks the session to do.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    Apply(OperationRequest),
    Reset,
    Exit,
}

/// Keyboard stand-in for an operation picker and a parameter slider.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Controls {
    pub operation: Operation,
    pub param: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            operation: Operation::Scale,
            param: 1.0,
        }
    }
}

impl Controls {
    pub fn handle_key(&mut self, key: Key) -> Option<Command> {
        match key {
            Key::Digit1 => self.select(Operation::Scale),
            Key::Digit2 => self.select(Operation::Rotate),
            Key::Digit3 => self.select(Operation::Translate),
            Key::Digit4 => self.select(Operation::Inflate),

            Key::ArrowUp => self.nudge(PARAM_STEP),
            Key::ArrowDown => self.nudge(-PARAM_STEP),

            Key::Enter | Key::Space => return Some(Command::Apply(self.request())),
            Key::R => return Some(Command::Reset),
            Key::Escape => return Some(Command::Exit),

            _ => {}
        }
        None
    }

    pub fn request(&self) -> OperationRequest {
        OperationRequest::new(self.operation, self.param)
    }

    fn select(&mut self, operation: Operation) {
        self.operation = operation;
        log::info!("operation: {operation} (param {:.1})", self.param);
    }

    fn nudge(&mut self, delta: f32) {
        // Snap to the step grid so repeated nudges do not drift.
        let stepped = ((self.param + delta) / PARAM_STEP).round() * PARAM_STEP;
        self.param = stepped.clamp(PARAM_MIN, PARAM_MAX);
        log::info!("{}: param {:.1}", self.operation, self.param);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_select_operations() {
        let mut c = Controls::default();
        for (key, op) in [
            (Key::Digit2, Operation::Rotate),
            (Key::Digit3, Operation::Translate),
            (Key::Digit4, Operation::Inflate),
            (Key::Digit1, Operation::Scale),
        ] {
            assert_eq!(c.handle_key(key), None);
            assert_eq!(c.operation, op);
        }
    }

    #[test]
    fn param_steps_and_clamps() {
        let mut c = Controls::default();
        c.handle_key(Key::ArrowUp);
        assert!((c.param - 1.1).abs() < 1e-6);

        for _ in 0..30 {
            c.handle_key(Key::ArrowUp);
        }
        assert_eq!(c.param, PARAM_MAX);

        for _ in 0..30 {
            c.handle_key(Key::ArrowDown);
        }
        assert_eq!(c.param, PARAM_MIN);
    }

    #[test]
    fn enter_and_space_apply_current_selection() {
        let mut c = Controls::default();
        c.handle_key(Key::Digit3);
        c.handle_key(Key::ArrowUp);
        let expected = Some(Command::Apply(OperationRequest::new(Operation::Translate, c.param)));
        assert_eq!(c.handle_key(Key::Enter), expected);
        assert_eq!(c.handle_key(Key::Space), expected);
    }

    #[test]
    fn reset_and_exit_keys() {
        let mut c = Controls::default();
        assert_eq!(c.handle_key(Key::R), Some(Command::Reset));
        assert_eq!(c.handle_key(Key::Escape), Some(Command::Exit));
        assert_eq!(c.handle_key(Key::Unknown(7)), None);
    }
}
