//! Surface geometry for panoramas.
//!
//! A panorama is drawn on the inside of a sphere by default, but any closed
//! (or open) triangle mesh can stand in. The same triangles are what
//! [`raycast_geometry`](crate::picking::raycast_geometry) tests against when
//! placing links, so a custom surface changes where link markers land.
//!
//! ```
//! use panosphere::Geometry;
//!
//! let sphere = Geometry::sphere(100.0, 60, 40);
//! assert_eq!(sphere.vertices.len(), 61 * 41);
//! // Quads everywhere except the single-triangle fans around each pole
//! assert_eq!(sphere.triangle_count(), 60 * 40 * 2 - 2 * 60);
//! ```

use crate::mesh::Vertex3d;
use glam::Vec3;

/// CPU-side triangle mesh: vertices plus a triangle index list.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices, three per face.
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Creates geometry from vertices and indices.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Builds a UV sphere centered at the origin.
    ///
    /// `width_segments` runs around the equator, `height_segments` from pole
    /// to pole. Both are clamped to the smallest values that still enclose
    /// a volume (3 and 2).
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let segments = width_segments.max(3);
        let rings = height_segments.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = 2.0 * std::f32::consts::PI * seg as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let position = [x * radius, y * radius, z * radius];
                let normal = [x, y, z];
                let uv = [seg as f32 / segments as f32, 1.0 - ring as f32 / rings as f32];

                vertices.push(Vertex3d::new(position, normal, uv));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                // Pole rings collapse to a point; only one triangle per quad there
                if ring != 0 {
                    indices.push(current);
                    indices.push(next);
                    indices.push(current + 1);
                }
                if ring != rings - 1 {
                    indices.push(current + 1);
                    indices.push(next);
                    indices.push(next + 1);
                }
            }
        }

        Self { vertices, indices }
    }

    /// Number of complete triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates triangle corner positions, skipping faces with out-of-range indices.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let a = self.vertices.get(tri[0] as usize)?;
            let b = self.vertices.get(tri[1] as usize)?;
            let c = self.vertices.get(tri[2] as usize)?;
            Some([
                Vec3::from(a.position),
                Vec3::from(b.position),
                Vec3::from(c.position),
            ])
        })
    }

    /// Computes the axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    /// Translates all vertices by the given offset.
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) + offset).into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let sphere = Geometry::sphere(100.0, 16, 8);
        for v in &sphere.vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - 100.0).abs() < 0.01, "vertex at distance {len}");
        }
    }

    #[test]
    fn sphere_clamps_degenerate_segments() {
        let sphere = Geometry::sphere(1.0, 0, 0);
        assert_eq!(sphere.triangle_count(), 3 * 2);
    }

    #[test]
    fn geometry_bounds() {
        let vertices = vec![
            Vertex3d::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([-1.0, -1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
        ];
        let geom = Geometry::new(vertices, vec![0, 1, 2]);

        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn triangles_skip_bad_indices() {
        let vertices = vec![
            Vertex3d::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
        ];
        let geom = Geometry::new(vertices, vec![0, 1, 2, 0, 1, 9, 2]);
        assert_eq!(geom.triangles().count(), 1);
    }

    #[test]
    fn translate_moves_center() {
        let mut sphere = Geometry::sphere(2.0, 8, 4);
        sphere.translate(Vec3::new(5.0, 0.0, 0.0));
        let center = sphere.center();
        assert!((center - Vec3::new(5.0, 0.0, 0.0)).length() < 0.001);
    }
}
