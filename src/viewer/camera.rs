//! Orbit camera
//!
//! Orbits a target point at a clamped distance. Yaw and pitch are in
//! radians; yaw 0 and pitch 0 look down -Z from +Z.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

const DEFAULT_DISTANCE: f32 = 5.0;
const DEFAULT_FOV_DEGREES: f32 = 50.0;
const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 10.0;

// Keep pitch just short of the poles so the up vector stays defined
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
    fov_degrees: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: DEFAULT_DISTANCE,
            yaw: 0.0,
            pitch: 0.0,
            fov_degrees: DEFAULT_FOV_DEGREES,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    /// World-space eye position
    pub fn position(&self) -> Vec3 {
        self.target + self.offset_direction() * self.distance
    }

    /// World-to-camera transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Orbit around the target
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Scale the orbit distance; factors below 1 move closer
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// Shift the target within the view plane
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = -self.offset_direction();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        self.target += right * dx + up * dy;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Unit vector from the target towards the eye
    fn offset_direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cp * sy, sp, cp * cy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_position() {
        let camera = OrbitCamera::new();
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(camera.fov_degrees(), 50.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = OrbitCamera::new();
        camera.zoom(0.1);
        assert_eq!(camera.distance(), 2.0);
        camera.zoom(100.0);
        assert_eq!(camera.distance(), 10.0);
        camera.zoom(-1.0);
        assert_eq!(camera.distance(), 10.0);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let mut camera = OrbitCamera::new();
        camera.rotate(FRAC_PI_2, 0.0);
        let pos = camera.position();
        assert_abs_diff_eq!(pos.x, 5.0, epsilon = 1e-4);
        assert_abs_diff_eq!(pos.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = OrbitCamera::new();
        camera.rotate(0.0, 10.0);
        assert!(camera.position().y < 5.0);
        assert!(camera.position().y > 4.99);
    }

    #[test]
    fn test_pan_moves_target_in_view_plane() {
        let mut camera = OrbitCamera::new();
        camera.pan(1.0, 2.0);
        assert_abs_diff_eq!(camera.target().x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(camera.target().y, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(camera.position().z, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pan_after_rotation_keeps_distance() {
        let mut camera = OrbitCamera::new();
        camera.rotate(0.7, 0.4);
        camera.pan(-2.0, 1.5);
        let offset = camera.position() - camera.target();
        assert_abs_diff_eq!(offset.length(), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_view_matrix_puts_target_ahead() {
        let camera = OrbitCamera::new();
        let in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert_abs_diff_eq!(in_view.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(in_view.y, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(in_view.z, -5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_reset() {
        let mut camera = OrbitCamera::new();
        camera.rotate(1.0, 0.5);
        camera.zoom(0.5);
        camera.pan(3.0, -1.0);
        camera.reset();
        assert_eq!(camera, OrbitCamera::default());
    }
}
