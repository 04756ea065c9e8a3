// src/input/fly_controller.rs
//! First-person fly camera controller
//!
//! WASD + Space/Shift movement with mouse look. Key events toggle movement
//! flags; mouse movement accumulates yaw and pitch while the cursor is
//! captured. `update` applies both to the camera once per frame.

use cgmath::{Quaternion, Rad, Rotation, Rotation3, Vector3};
use winit::keyboard::KeyCode;

use crate::gfx::camera::Camera;

use super::InputListener;

/// Pitch stays inside ±0.49π so the view never reaches the poles
pub const PITCH_LIMIT: f32 = 0.49 * std::f32::consts::PI;

/// State-machine fly controller
///
/// Orientation is rebuilt from the accumulated angles every frame as
/// yaw-about-world-Y composed with pitch-about-X (`yaw * pitch`), never
/// incrementally multiplied, so repeated look input cannot drift.
pub struct FlyController {
    pub speed: f32,
    pub sensitivity: f32,

    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,

    yaw: f32,
    pitch: f32,
    last_cursor: Option<(f64, f64)>,
    was_captured: bool,
}

impl FlyController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            forward: false,
            backward: false,
            left: false,
            right: false,
            up: false,
            down: false,
            yaw: 0.0,
            pitch: 0.0,
            last_cursor: None,
            was_captured: false,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// True while any movement flag is held
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right || self.up || self.down
    }

    /// Applies look orientation and movement to the camera
    ///
    /// Forward/backward follow the view direction, strafing follows
    /// view × world-up, and rise/fall move along world Y regardless of
    /// pitch. Simultaneous flags add up; diagonal movement is deliberately
    /// not renormalized.
    pub fn update(&mut self, delta: f32, camera: &mut Camera) {
        camera.orientation = Quaternion::from_angle_y(Rad(self.yaw))
            * Quaternion::from_angle_x(Rad(self.pitch));

        let view_dir = camera.orientation.rotate_vector(-Vector3::unit_z());
        let right_dir = view_dir.cross(Vector3::unit_y());
        let step = self.speed * delta;

        if self.forward {
            camera.position += view_dir * step;
        }
        if self.backward {
            camera.position -= view_dir * step;
        }
        if self.right {
            camera.position += right_dir * step;
        }
        if self.left {
            camera.position -= right_dir * step;
        }
        if self.up {
            camera.position.y += step;
        }
        if self.down {
            camera.position.y -= step;
        }
    }
}

impl InputListener for FlyController {
    // Key events update flags but are never consumed, so later listeners
    // (the UI overlay) still observe them.
    fn on_key_down(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::KeyW => self.forward = true,
            KeyCode::KeyS => self.backward = true,
            KeyCode::KeyA => self.left = true,
            KeyCode::KeyD => self.right = true,
            KeyCode::Space => self.up = true,
            KeyCode::ShiftLeft => self.down = true,
            _ => {}
        }
        false
    }

    fn on_key_up(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::KeyW => self.forward = false,
            KeyCode::KeyS => self.backward = false,
            KeyCode::KeyA => self.left = false,
            KeyCode::KeyD => self.right = false,
            KeyCode::Space => self.up = false,
            KeyCode::ShiftLeft => self.down = false,
            _ => {}
        }
        false
    }

    fn on_mouse_move(&mut self, x: f64, y: f64, captured: bool) -> bool {
        if !captured {
            // Track the position but let the event pass through to the UI.
            self.last_cursor = Some((x, y));
            self.was_captured = false;
            return false;
        }

        // Only apply a delta when the previous sample was also captured;
        // the first sample after recapture just resynchronizes the
        // reference position.
        if self.was_captured {
            if let Some((last_x, last_y)) = self.last_cursor {
                self.yaw -= (x - last_x) as f32 * self.sensitivity;
                self.pitch -= (y - last_y) as f32 * self.sensitivity;
                self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
            }
        }

        self.last_cursor = Some((x, y));
        self.was_captured = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    fn camera() -> Camera {
        Camera::perspective(1280, 720, 60.0).unwrap()
    }

    fn assert_near(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
    }

    #[test]
    fn test_forward_moves_along_view_direction() {
        let mut controller = FlyController::new(5.0, 0.002);
        let mut camera = camera();

        controller.on_key_down(KeyCode::KeyW);
        controller.update(1.0, &mut camera);

        assert_near(camera.position.x, 0.0);
        assert_near(camera.position.y, 0.0);
        assert_near(camera.position.z, -5.0);
    }

    #[test]
    fn test_key_up_returns_flag_to_rest() {
        let mut controller = FlyController::new(5.0, 0.002);
        let mut camera = camera();

        controller.on_key_down(KeyCode::KeyW);
        controller.on_key_up(KeyCode::KeyW);
        assert!(!controller.is_moving());

        controller.update(10.0, &mut camera);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_unmapped_keys_are_not_consumed() {
        let mut controller = FlyController::new(5.0, 0.002);
        assert!(!controller.on_key_down(KeyCode::KeyQ));
        assert!(!controller.on_key_up(KeyCode::KeyQ));
        assert!(!controller.is_moving());
    }

    #[test]
    fn test_diagonal_movement_is_additive() {
        let mut controller = FlyController::new(5.0, 0.002);
        let mut camera = camera();

        controller.on_key_down(KeyCode::KeyW);
        controller.on_key_down(KeyCode::KeyD);
        controller.update(1.0, &mut camera);

        // Both axes moved the full per-axis distance; the diagonal is
        // longer than `speed * delta` by design.
        assert_near(camera.position.x, 5.0);
        assert_near(camera.position.z, -5.0);
    }

    #[test]
    fn test_rise_ignores_pitch() {
        let mut controller = FlyController::new(2.0, 0.01);
        let mut camera = camera();

        // Pitch steeply down, then rise: movement must still be world +Y
        controller.on_mouse_move(0.0, 0.0, true);
        controller.on_mouse_move(0.0, 100.0, true);
        assert!(controller.pitch() < 0.0);

        controller.on_key_down(KeyCode::Space);
        controller.update(1.0, &mut camera);

        assert_near(camera.position.x, 0.0);
        assert_near(camera.position.y, 2.0);
        assert_near(camera.position.z, 0.0);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut controller = FlyController::new(5.0, 0.01);

        controller.on_mouse_move(0.0, 0.0, true);
        controller.on_mouse_move(0.0, 100000.0, true);
        assert_near(controller.pitch(), -PITCH_LIMIT);

        controller.on_mouse_move(0.0, -100000.0, true);
        assert_near(controller.pitch(), PITCH_LIMIT);
    }

    #[test]
    fn test_uncaptured_mouse_is_passed_through() {
        let mut controller = FlyController::new(5.0, 0.01);
        let mut camera = camera();
        let initial = camera.orientation;

        assert!(!controller.on_mouse_move(50.0, 50.0, false));
        assert!(!controller.on_mouse_move(500.0, 500.0, false));

        controller.update(1.0, &mut camera);
        assert_eq!(controller.yaw(), 0.0);
        assert_eq!(controller.pitch(), 0.0);
        assert_eq!(camera.orientation, initial);
    }

    #[test]
    fn test_recapture_does_not_apply_stale_delta() {
        let mut controller = FlyController::new(5.0, 0.01);

        // Captured at one corner of the window
        assert!(controller.on_mouse_move(0.0, 0.0, true));
        // UI frees the cursor and the user moves it far away
        assert!(!controller.on_mouse_move(800.0, 600.0, false));
        // First captured sample only resynchronizes the reference
        assert!(controller.on_mouse_move(800.0, 600.0, true));
        assert_eq!(controller.yaw(), 0.0);
        assert_eq!(controller.pitch(), 0.0);

        // The next delta is measured from the resynchronized position
        controller.on_mouse_move(810.0, 600.0, true);
        assert_near(controller.yaw(), -0.1);
    }

    #[test]
    fn test_consumed_only_while_captured() {
        let mut controller = FlyController::new(5.0, 0.01);
        assert!(!controller.on_mouse_move(1.0, 1.0, false));
        assert!(controller.on_mouse_move(2.0, 2.0, true));
    }

    #[test]
    fn test_yaw_turns_the_camera() {
        let mut controller = FlyController::new(1.0, 0.01);
        let mut camera = camera();

        controller.on_mouse_move(0.0, 0.0, true);
        // Mouse right should turn the view right (negative yaw about +Y)
        controller.on_mouse_move(100.0, 0.0, true);
        assert!(controller.yaw() < 0.0);

        controller.update(0.0, &mut camera);
        let dir = camera.view_dir();
        assert!(dir.x > 0.0, "view should swing towards +X, got {:?}", dir);
    }
}
