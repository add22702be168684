use glam::{Mat4, Vec3};

use crate::input::{InputEvent, MouseButtonState, PointerButtonEvent, PointerMoveEvent};

/// Radians of rotation per logical pixel of pointer movement.
pub const ORBIT_SENSITIVITY: f32 = 0.005;

pub const ZOOM_MIN: f32 = 0.5;
pub const ZOOM_MAX: f32 = 10.0;

const ZOOM_OUT: f32 = 1.08;
const ZOOM_IN: f32 = 0.92;

/// Vertical field of view, 45 degrees.
pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Interactive orbit camera.
///
/// Mutated by the input path and read once per frame by the render path; both
/// run on the event-loop thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    /// Rotation about X, radians. Unclamped.
    pub rotation_x: f32,
    /// Rotation about Y, radians. Unclamped.
    pub rotation_y: f32,
    /// Eye distance along +Z, in `[ZOOM_MIN, ZOOM_MAX]`.
    pub zoom: f32,
    /// True while a primary or secondary button drag is active.
    pub dragging: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            rotation_x: 0.5,
            rotation_y: 0.5,
            zoom: 3.0,
            dragging: false,
        }
    }
}

impl CameraState {
    /// Applies an input event; returns whether the camera changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerButton(PointerButtonEvent { button, state }) if button.is_orbit_button() => {
                self.dragging = *state == MouseButtonState::Pressed;
                false
            }

            InputEvent::PointerMoved(PointerMoveEvent { dx, dy, .. }) if self.dragging => {
                self.orbit(*dx, *dy);
                *dx != 0.0 || *dy != 0.0
            }

            InputEvent::MouseWheel { delta } => {
                let y = delta.y();
                if y == 0.0 {
                    return false;
                }
                // winit: negative y scrolls down (toward the user).
                self.zoom_by(if y < 0.0 { ZOOM_OUT } else { ZOOM_IN });
                true
            }

            InputEvent::PointerLeft | InputEvent::Focused(false) => {
                self.dragging = false;
                false
            }

            _ => false,
        }
    }

    /// Adds pointer movement (logical pixels) to the orbit angles.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.rotation_y += dx * ORBIT_SENSITIVITY;
        self.rotation_x += dy * ORBIT_SENSITIVITY;
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// `rotX * rotY`.
    pub fn model(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation_x) * Mat4::from_rotation_y(self.rotation_y)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.zoom))
    }

    /// `projection * (view * model)` for a surface of the given aspect ratio.
    ///
    /// GL-style clip depth; the default pose keeps the mesh inside wgpu's `[0, 1]`.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let projection = Mat4::perspective_rh_gl(FOV_Y, aspect, Z_NEAR, Z_FAR);
        projection * (self.view() * self.model())
    }
}

/// Flattens `m` row by row (`out[row * 4 + col]`), the camera uniform layout.
///
/// The mesh shader reads these bytes column-major, i.e. as the transpose, and
/// computes `v * M` to get `M * v`.
pub fn row_major(m: &Mat4) -> [f32; 16] {
    m.transpose().to_cols_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseButton, MouseWheelDelta};
    use glam::Vec4;

    fn press(button: MouseButton, state: MouseButtonState) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent { button, state })
    }

    fn moved(dx: f32, dy: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x: 0.0, y: 0.0, dx, dy })
    }

    fn wheel(y: f32) -> InputEvent {
        InputEvent::MouseWheel {
            delta: MouseWheelDelta::Line { x: 0.0, y },
        }
    }

    #[test]
    fn default_pose() {
        let c = CameraState::default();
        assert_eq!((c.rotation_x, c.rotation_y, c.zoom), (0.5, 0.5, 3.0));
        assert!(!c.dragging);
    }

    #[test]
    fn movement_without_drag_is_ignored() {
        let mut c = CameraState::default();
        assert!(!c.handle_input(&moved(100.0, 100.0)));
        assert_eq!(c, CameraState::default());
    }

    #[test]
    fn drag_orbits_with_either_button() {
        for button in [MouseButton::Left, MouseButton::Right] {
            let mut c = CameraState::default();
            c.handle_input(&press(button, MouseButtonState::Pressed));
            assert!(c.handle_input(&moved(20.0, -10.0)));
            assert!((c.rotation_y - 0.6).abs() < 1e-6);
            assert!((c.rotation_x - 0.45).abs() < 1e-6);

            c.handle_input(&press(button, MouseButtonState::Released));
            assert!(!c.handle_input(&moved(20.0, -10.0)));
        }
    }

    #[test]
    fn middle_button_does_not_orbit() {
        let mut c = CameraState::default();
        c.handle_input(&press(MouseButton::Middle, MouseButtonState::Pressed));
        assert!(!c.dragging);
    }

    #[test]
    fn orbit_is_unclamped() {
        let mut c = CameraState::default();
        c.orbit(0.0, 10_000.0);
        assert!((c.rotation_x - 50.5).abs() < 1e-3);
    }

    #[test]
    fn wheel_zoom_steps_and_clamps() {
        let mut c = CameraState::default();
        c.handle_input(&wheel(-1.0));
        assert!((c.zoom - 3.24).abs() < 1e-5);
        c.handle_input(&wheel(1.0));
        assert!((c.zoom - 3.24 * 0.92).abs() < 1e-5);

        for _ in 0..200 {
            c.handle_input(&wheel(-1.0));
        }
        assert_eq!(c.zoom, ZOOM_MAX);
        for _ in 0..200 {
            c.handle_input(&wheel(1.0));
        }
        assert_eq!(c.zoom, ZOOM_MIN);
    }

    #[test]
    fn pointer_leave_ends_drag() {
        let mut c = CameraState::default();
        c.handle_input(&press(MouseButton::Left, MouseButtonState::Pressed));
        c.handle_input(&InputEvent::PointerLeft);
        assert!(!c.dragging);
    }

    #[test]
    fn origin_projects_in_front_of_camera() {
        let c = CameraState::default();
        let clip = c.view_projection(16.0 / 9.0) * Vec4::W;
        // Model rotation fixes the origin; view pushes it to z = -zoom.
        assert!((clip.w - 3.0).abs() < 1e-5);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        let ndc_z = clip.z / clip.w;
        assert!((0.0..1.0).contains(&ndc_z));
    }

    #[test]
    fn view_projection_composes_in_order() {
        let c = CameraState {
            rotation_x: 0.3,
            rotation_y: -1.1,
            zoom: 2.0,
            dragging: false,
        };
        let p = Mat4::perspective_rh_gl(FOV_Y, 1.5, Z_NEAR, Z_FAR);
        let v = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0));
        let m = Mat4::from_rotation_x(0.3) * Mat4::from_rotation_y(-1.1);
        assert_eq!(c.view_projection(1.5), p * (v * m));
    }

    fn sample(seed: f32) -> Mat4 {
        let mut m = [0.0f32; 16];
        for (i, v) in m.iter_mut().enumerate() {
            *v = (seed + i as f32 * 0.37).sin() * 2.0;
        }
        Mat4::from_cols_array(&m)
    }

    #[test]
    fn identity_is_two_sided() {
        let m = sample(1.3);
        assert_eq!(Mat4::IDENTITY * m, m);
        assert_eq!(m * Mat4::IDENTITY, m);
    }

    #[test]
    fn multiply_is_associative() {
        let (a, b, c) = (sample(0.1), sample(2.4), sample(-0.7));
        assert!(((a * b) * c).abs_diff_eq(a * (b * c), 1e-4));
    }

    #[test]
    fn perspective_row_layout() {
        let (n, f) = (Z_NEAR, Z_FAR);
        let p = row_major(&Mat4::perspective_rh_gl(FOV_Y, 1.5, n, f));
        let focal = 1.0 / (FOV_Y / 2.0).tan();
        assert!((p[0] - focal / 1.5).abs() < 1e-6);
        assert!((p[5] - focal).abs() < 1e-6);
        assert!((p[10] - (f + n) / (n - f)).abs() < 1e-6);
        assert!((p[11] - 2.0 * f * n / (n - f)).abs() < 1e-5);
        assert_eq!(&p[12..], &[0.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn view_translation_lands_in_last_column() {
        let c = CameraState::default();
        let v = row_major(&c.view());
        assert_eq!((v[3], v[7], v[11]), (0.0, 0.0, -3.0));
    }

    #[test]
    fn model_rotates_like_the_kernel() {
        // Rotation about Y by +90 degrees sends +X to -Z.
        let c = CameraState {
            rotation_x: 0.0,
            rotation_y: std::f32::consts::FRAC_PI_2,
            ..CameraState::default()
        };
        let p = c.model().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }
}
