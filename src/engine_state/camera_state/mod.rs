//! # Camera State Management
//!
//! This module handles the viewer's eye: position, yaw/pitch orientation and the input
//! that turns and walks it. The player controller owns one `CameraState` and moves its
//! position; the orchestrator and the ray caster read it.
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `CameraController`: Collects player input and applies it once per tick

use cgmath::{Point2, Point3, Rad, Vector3};

use crate::engine_state::voxels::chunk::{coordinates::chunk_of_position, ChunkDimensions};

use super::player_state::PlayerAction;

pub mod camera;

pub use camera::{Camera, CameraController};

/// Radians turned per unit of look delta.
pub const LOOK_SENSITIVITY: f32 = 0.002;

/// Manages the camera and the controller feeding it.
#[derive(Debug)]
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
}

impl CameraState {
    /// Creates a camera at `position`, looking along `yaw`/`pitch`.
    pub fn new(position: Point3<f32>, yaw: Rad<f32>, pitch: Rad<f32>) -> Self {
        CameraState {
            camera: Camera::new(position, yaw, pitch),
            camera_controller: CameraController::new(LOOK_SENSITIVITY),
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Applies pending rotation and returns the unit walking direction for this tick.
    pub fn update(&mut self) -> Vector3<f32> {
        self.camera_controller.update_camera(&mut self.camera)
    }

    /// The chunk the camera stands in.
    pub fn chunk_position(&self, dimensions: &ChunkDimensions) -> Point2<i32> {
        chunk_of_position(dimensions, self.camera.position.x, self.camera.position.z)
    }
}
