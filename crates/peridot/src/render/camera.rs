//! The 2D camera.

use crate::math::{Mat4, Vec3};

/// World camera: position, Euler rotation, uniform zoom.
///
/// The position is stored **negated** — `set_position(10, 0)` records
/// `(-10, 0, 0)` so the stored value is exactly the view-matrix
/// translation. Pointer-to-world conversion subtracts this stored value
/// directly. Zoom scales the view matrix but is *not* part of the pointer
/// conversion, so hit testing drifts under zoom.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    rotation: Vec3,
    zoom: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            zoom: 1.0,
        }
    }

    /// Moves the camera to `(x, y, z)` in world space. Stored negated.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(-x, -y, -z);
    }

    /// The stored (negated) position, i.e. the view-matrix translation.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    /// View matrix: `T * Rx * Ry * Rz * zoom`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_scale(Vec3::splat(self.zoom))
    }

    /// Orthographic projection centered on the surface: x and y span
    /// half the surface in each direction, z clips at ±100.
    pub fn projection(&self, surface_width: u32, surface_height: u32) -> Mat4 {
        let hw = surface_width as f32 / 2.0;
        let hh = surface_height as f32 / 2.0;
        Mat4::orthographic_rh(-hw, hw, -hh, hh, -100.0, 100.0)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_stored_negated() {
        let mut camera = Camera::new();
        camera.set_position(10.0, -4.0, 0.0);
        assert_eq!(camera.position(), Vec3::new(-10.0, 4.0, 0.0));
    }

    #[test]
    fn view_matrix_translates_by_stored_position() {
        let mut camera = Camera::new();
        camera.set_position(10.0, 0.0, 0.0);
        let origin = camera.view_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        // A world origin viewed from a camera at +10 appears at -10.
        assert_eq!(origin.x, -10.0);
    }
}
