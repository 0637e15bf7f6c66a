//! Math types — thin re-exports of [`glam`] plus the node transform.

pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Local transform of a scene node.
///
/// `scale` holds **half-extents**: a node constructed from a 100×40 size
/// stores `(50, 20, 0.5)`. [`Transform::from_size`] performs the halving;
/// assignments through `set_scale` store the given values verbatim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    /// Half-extents, not full size.
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Builds a transform from a full display size, halving every component.
    pub fn from_size(position: Vec3, size: Vec2, rotation: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::new(size.x / 2.0, size.y / 2.0, 0.5),
        }
    }

    /// Local matrix: `T * Rx * Ry * Rz * S`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_scale(self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned box in world units, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            left: center.x - half.x,
            right: center.x + half.x,
            top: center.y + half.y,
            bottom: center.y - half.y,
        }
    }

    /// Inclusive containment: points on the edge count as inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    /// Strict overlap: boxes that merely share an edge do not collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.bottom < other.top
            && self.top > other.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_size_halves_every_component() {
        let t = Transform::from_size(Vec3::ZERO, Vec2::new(100.0, 40.0), Vec3::ZERO);
        assert_eq!(t.scale, Vec3::new(50.0, 20.0, 0.5));
    }

    #[test]
    fn aabb_edges_are_inclusive() {
        let b = Aabb::from_center(Vec2::ZERO, Vec2::new(10.0, 5.0));
        assert!(b.contains(10.0, 5.0));
        assert!(b.contains(-10.0, -5.0));
        assert!(!b.contains(10.1, 0.0));
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(5.0));
        let b = Aabb::from_center(Vec2::new(10.0, 0.0), Vec2::splat(5.0));
        let c = Aabb::from_center(Vec2::new(9.9, 0.0), Vec2::splat(5.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }
}
