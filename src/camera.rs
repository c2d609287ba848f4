//! First-person camera for walking through the scene.
//!
//! The camera keeps its orientation as a pair of Euler angles and derives the
//! look direction from them. Pitch is clamped short of the poles so the view
//! never lines up with the up vector.
//!
//! # Example
//!
//! ```
//! use stormview::camera::{Camera, MoveDirection};
//! use glam::Vec3;
//!
//! let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
//! camera.move_in(MoveDirection::Forward, 1.0);
//! camera.rotate(10.0, 0.0);
//! let view = camera.view_matrix();
//! # let _ = view;
//! ```

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Largest pitch magnitude in degrees.
pub const PITCH_LIMIT: f32 = 89.0;

/// Direction for a single movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// Euler-angle first-person camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    /// Horizontal angle in degrees. -90 looks down -Z.
    yaw: f32,
    /// Vertical angle in degrees, always within ±[`PITCH_LIMIT`].
    pitch: f32,
}

impl Camera {
    /// Create a camera at `position` looking towards `target`.
    ///
    /// Yaw and pitch are derived from the initial look direction, so the first
    /// call to [`rotate`](Self::rotate) continues smoothly from the starting
    /// view. If `target` coincides with `position` the camera looks down -Z.
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let front = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let yaw = front.z.atan2(front.x).to_degrees();
        let pitch = front
            .y
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);

        Self {
            position,
            front,
            up,
            yaw,
            pitch,
        }
    }

    /// World-space position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit look direction.
    #[inline]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Up reference vector.
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Yaw in degrees.
    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees.
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Right-handed look-at transform for the current state.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Displace the camera by `speed` world units.
    ///
    /// Strafing uses `cross(front, up)` re-normalized on every call, since
    /// `front` and `up` are not kept orthogonal.
    pub fn move_in(&mut self, direction: MoveDirection, speed: f32) {
        match direction {
            MoveDirection::Forward => self.position += self.front * speed,
            MoveDirection::Backward => self.position -= self.front * speed,
            MoveDirection::Left => self.position -= self.right() * speed,
            MoveDirection::Right => self.position += self.right() * speed,
        }
    }

    /// Add angle deltas (degrees) and recompute the look direction.
    pub fn rotate(&mut self, pitch_delta: f32, yaw_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        let front = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos);
        self.front = front.try_normalize().unwrap_or(self.front);
    }

    fn right(&self) -> Vec3 {
        // Zero when front is parallel to up; the strafe is then a no-op.
        self.front.cross(self.up).normalize_or_zero()
    }
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    /// Right-handed perspective matrix for the given aspect ratio.
    ///
    /// A non-positive or non-finite aspect (minimized window) falls back to 1.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn test_camera() -> Camera {
        Camera::new(Vec3::new(-1.1, 0.9, 2.75), Vec3::new(-1.4, 1.0, 0.0), Vec3::Y)
    }

    #[test]
    fn test_new_derives_angles_from_target() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert!((camera.yaw() - (-90.0)).abs() < 1e-4);
        assert!(camera.pitch().abs() < 1e-4);
        assert!((camera.front() - Vec3::NEG_Z).length() < EPS);
    }

    #[test]
    fn test_first_rotate_keeps_initial_view() {
        let mut camera = test_camera();
        let before = camera.front();
        camera.rotate(0.0, 0.0);
        assert!((camera.front() - before).length() < 1e-4);
    }

    #[test]
    fn test_degenerate_target_looks_down_negative_z() {
        let camera = Camera::new(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert_eq!(camera.front(), Vec3::NEG_Z);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn test_pitch_clamps() {
        let mut camera = test_camera();
        camera.rotate(500.0, 0.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        camera.rotate(-30.0, 0.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT - 30.0);
        camera.rotate(-1000.0, 0.0);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn test_front_unit_after_rotate() {
        let mut camera = test_camera();
        for step in 0..200 {
            let s = step as f32;
            camera.rotate((s * 0.37).sin() * 40.0, s * 13.0 - 700.0);
            assert!((camera.front().length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_forward_backward_cancels() {
        let mut camera = test_camera();
        camera.rotate(12.0, 33.0);
        let start = camera.position();
        camera.move_in(MoveDirection::Forward, 0.75);
        assert!((camera.position() - start).length() > 0.7);
        camera.move_in(MoveDirection::Backward, 0.75);
        assert!((camera.position() - start).length() < EPS);
    }

    #[test]
    fn test_strafe_is_horizontal_and_unit() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        camera.rotate(45.0, 0.0);
        camera.move_in(MoveDirection::Right, 2.0);
        let moved = camera.position();
        assert!((moved.length() - 2.0).abs() < EPS);
        assert!(moved.y.abs() < EPS);
        assert!(moved.x > 0.0);

        camera.move_in(MoveDirection::Left, 2.0);
        assert!(camera.position().length() < EPS);
    }

    #[test]
    fn test_view_matrix_is_pure() {
        let camera = test_camera();
        assert_eq!(camera.view_matrix(), camera.view_matrix());
    }

    #[test]
    fn test_projection_guards_aspect() {
        let projection = Projection::default();
        assert!(projection.matrix(0.0).is_finite());
        assert_eq!(projection.matrix(f32::NAN), projection.matrix(1.0));
    }
}
