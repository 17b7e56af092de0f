//! # Camera Implementation
//!
//! This module contains the first-person camera:
//! - `Camera`: eye position and yaw/pitch orientation
//! - `CameraController`: collects look and movement input between ticks
//!
//! Yaw is measured from +X towards +Z, pitch upwards from the horizon, so the view
//! direction is `(cos(yaw) * cos(pitch), sin(pitch), sin(yaw) * cos(pitch))`.

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

use crate::engine_state::player_state::PlayerAction;

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Represents a first-person camera in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation in radians, clamped just short of straight up/down
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial eye position in world space
    /// * `yaw` - Initial yaw (can be any type convertible to `Rad<f32>`)
    /// * `pitch` - Initial pitch, clamped to the safe range
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// Gets the camera's normalized view direction.
    pub fn get_view_vec(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize()
    }

    /// Horizontal forward and right vectors, used for walking.
    pub fn horizontal_basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin);
        let right = Vector3::new(-yaw_sin, 0.0, yaw_cos);
        (forward, right)
    }

    /// Calculates the right-handed view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.get_view_vec(), Vector3::unit_y())
    }

    /// Turns the camera, keeping pitch inside the safe range.
    pub fn rotate(&mut self, yaw: Rad<f32>, pitch: Rad<f32>) {
        self.yaw += yaw;
        self.pitch += pitch;
        self.clamp_pitch();
    }

    fn clamp_pitch(&mut self) {
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }
}

/// Handles camera rotation and walking intent based on player input.
///
/// Input is accumulated by `intake_actions` and consumed once per tick by
/// `update_camera`.
#[derive(Debug, Default)]
pub struct CameraController {
    // Movement amounts (0 or 1)
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,

    // Rotation amounts (raw look deltas)
    rotate_horizontal: f32,
    rotate_vertical: f32,

    sensitivity: f32,
}

impl CameraController {
    /// Creates a new camera controller.
    ///
    /// # Arguments
    /// * `sensitivity` - Radians of rotation per unit of look delta
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            ..Default::default()
        }
    }

    /// Processes player actions and updates controller state accordingly.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.amount_forward = if actions.move_forward { 1.0 } else { 0.0 };
        self.amount_backward = if actions.move_backward { 1.0 } else { 0.0 };
        self.amount_left = if actions.move_left { 1.0 } else { 0.0 };
        self.amount_right = if actions.move_right { 1.0 } else { 0.0 };
        if let Some((delta_x, delta_y)) = actions.rotate_view {
            self.rotate_horizontal += delta_x as f32;
            self.rotate_vertical += delta_y as f32;
        }
    }

    /// Checks if there are any pending updates that would affect the camera.
    pub fn has_updates(&self) -> bool {
        self.amount_forward > 0.0
            || self.amount_backward > 0.0
            || self.amount_left > 0.0
            || self.amount_right > 0.0
            || self.rotate_horizontal != 0.0
            || self.rotate_vertical != 0.0
    }

    /// Applies pending rotation to `camera` and returns the horizontal walking
    /// direction (unit length, or zero when standing still). Resets the controller.
    pub fn update_camera(&mut self, camera: &mut Camera) -> Vector3<f32> {
        camera.rotate(
            Rad(self.rotate_horizontal * self.sensitivity),
            Rad(-self.rotate_vertical * self.sensitivity),
        );

        let (forward, right) = camera.horizontal_basis();
        let direction = forward * (self.amount_forward - self.amount_backward)
            + right * (self.amount_right - self.amount_left);

        *self = Self::new(self.sensitivity);

        if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            direction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_vector_follows_yaw_and_pitch() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        assert!((camera.get_view_vec() - Vector3::unit_x()).magnitude() < 1e-6);

        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(90.0), Deg(0.0));
        assert!((camera.get_view_vec() - Vector3::unit_z()).magnitude() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        camera.rotate(Rad(0.0), Rad(10.0));
        assert_eq!(camera.pitch, Rad(SAFE_FRAC_PI_2));
        camera.rotate(Rad(0.0), Rad(-20.0));
        assert_eq!(camera.pitch, -Rad(SAFE_FRAC_PI_2));
    }

    #[test]
    fn controller_walks_along_the_horizontal_view_and_resets() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Deg(-45.0));
        let mut controller = CameraController::new(0.01);
        controller.intake_actions(&PlayerAction {
            move_forward: true,
            move_right: true,
            ..Default::default()
        });
        assert!(controller.has_updates());

        let direction = controller.update_camera(&mut camera);
        let expected = Vector3::new(1.0, 0.0, 1.0).normalize();
        assert!((direction - expected).magnitude() < 1e-6);
        assert!(!controller.has_updates());
        assert_eq!(controller.update_camera(&mut camera), Vector3::new(0.0, 0.0, 0.0));
    }
}
