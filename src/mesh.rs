//! Vertex format and spatial transforms for scene nodes.
//!
//! - [`Vertex3d`]: The vertex format used by panorama geometry, containing position, normal, and UV data
//! - [`Transform`]: Position, rotation, and scale for placing nodes in 3D space
//!
//! # Transforms
//!
//! [`Transform`] uses a builder pattern for ergonomic positioning:
//!
//! ```
//! use panosphere::{Transform, Vec3, Quat};
//!
//! let transform = Transform::new()
//!     .position(Vec3::new(0.0, 2.0, -5.0))
//!     .rotation(Quat::from_rotation_y(0.5))
//!     .uniform_scale(2.0);
//!
//! let positioned = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
//! ```

use glam::{Mat4, Quat, Vec3};

/// A vertex with position, normal, and texture coordinates.
///
/// `#[repr(C)]` plus [`bytemuck::Pod`] keeps the layout predictable so a
/// renderer can upload panorama geometry without copying (32 bytes per vertex).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// The 3D position of this vertex in model space.
    pub position: [f32; 3],
    /// The surface normal vector.
    pub normal: [f32; 3],
    /// Texture coordinates, typically in the range [0, 1].
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// Creates a new vertex with the given position, normal, and UV coordinates.
    ///
    /// ```
    /// use panosphere::Vertex3d;
    ///
    /// let vertex = Vertex3d::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]);
    /// assert_eq!(vertex.uv, [1.0, 0.0]);
    /// ```
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Position, rotation, and scale of a scene node relative to its parent.
///
/// Panoramas carry a transform with a negated X scale so the sphere's
/// inside faces the viewer. See [`PanoramaWorld::add`](crate::PanoramaWorld::add).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates a new identity transform (origin, no rotation, unit scale).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transform positioned at the given location.
    ///
    /// ```
    /// use panosphere::{Transform, Vec3};
    ///
    /// let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
    /// assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Sets the position (translation) component.
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the rotation component using a quaternion.
    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets non-uniform scale factors for each axis.
    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Sets uniform scale on all axes.
    ///
    /// ```
    /// use panosphere::{Transform, Vec3};
    ///
    /// let transform = Transform::new().uniform_scale(2.0);
    /// assert_eq!(transform.scale, Vec3::new(2.0, 2.0, 2.0));
    /// ```
    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Negates the X scale in place.
    pub fn mirror_x(&mut self) {
        self.scale.x = -self.scale.x;
    }

    /// Converts this transform to a 4×4 matrix in SRT order (Scale, Rotate, Translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_x_twice_is_identity() {
        let mut transform = Transform::new().scale(Vec3::new(7.0, 7.0, 1.0));
        transform.mirror_x();
        assert_eq!(transform.scale, Vec3::new(-7.0, 7.0, 1.0));
        transform.mirror_x();
        assert_eq!(transform.scale, Vec3::new(7.0, 7.0, 1.0));
    }

    #[test]
    fn matrix_applies_scale_before_translation() {
        let transform = Transform::new()
            .position(Vec3::new(10.0, 0.0, 0.0))
            .scale(Vec3::new(-1.0, 1.0, 1.0));
        let p = transform.matrix().transform_point3(Vec3::new(2.0, 3.0, 0.0));
        assert_eq!(p, Vec3::new(8.0, 3.0, 0.0));
    }
}
