//! Ray casting against panorama surfaces and markers.
//!
//! - [`Ray`]: A 3D ray with origin and direction
//! - [`RayHit`]: Distance and world-space point of an intersection
//! - [`raycast_geometry`]: Every hit of a ray on a transformed triangle mesh
//! - [`pick_marker`]: The nearest visible marker under a ray
//!
//! Link placement casts from a panorama's center toward another panorama and
//! keeps the farthest hit on its own surface:
//!
//! ```
//! use panosphere::{Geometry, Ray, Transform, Vec3, raycast_geometry};
//!
//! let sphere = Geometry::sphere(100.0, 32, 16);
//! let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.1, 0.05));
//! let hits = raycast_geometry(&ray, &sphere, Transform::new().matrix());
//!
//! let farthest = hits.last().unwrap();
//! assert!((farthest.distance - 100.0).abs() < 1.0);
//! ```

use glam::{Mat4, Vec3};
use hecs::Entity;

use crate::ecs::{Visible, world_matrix};
use crate::geometry::Geometry;
use crate::marker::Marker;

/// Hits closer than this along the ray are ignored.
const RAY_EPSILON: f32 = 1e-6;

/// Barycentric slack so rays through shared edges and vertices are not lost.
const EDGE_EPSILON: f32 = 1e-5;

/// Triangles whose doubled area is below this fraction of their longest
/// edge squared are slivers and never hit.
const SLIVER_RATIO: f32 = 1e-4;

/// A ray in 3D space with an origin and a normalized direction.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// The starting point of the ray.
    pub origin: Vec3,
    /// The normalized direction of the ray. Zero if constructed from a zero vector.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with the given origin and direction.
    ///
    /// The direction is normalized; a zero direction stays zero and such a
    /// ray hits nothing.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get a point along the ray at the given distance from the origin.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Whether the direction is usable for casting.
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }

    /// Test intersection with a sphere.
    ///
    /// Returns the distance to the nearest positive intersection, or `None`.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.dot(self.direction);
        if a == 0.0 {
            return None;
        }
        let b = 2.0 * oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = (-b - sqrt_disc) / (2.0 * a);
        let t2 = (-b + sqrt_disc) / (2.0 * a);

        if t1 > 0.0 {
            Some(t1)
        } else if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }

    /// Test intersection with a triangle, from either side.
    ///
    /// Returns the ray parameter of the hit (Möller–Trumbore). The parameter
    /// is a distance only when the direction is unit length.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;

        // Edge slack on a near-zero-area triangle admits hits far off the surface
        let longest = edge1
            .length_squared()
            .max(edge2.length_squared())
            .max((c - b).length_squared());
        if edge1.cross(edge2).length() <= SLIVER_RATIO * longest {
            return None;
        }

        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);

        // Parallel to the triangle plane (or a degenerate triangle)
        if det.abs() < f32::EPSILON * edge1.length() * edge2.length() {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(-EDGE_EPSILON..=1.0 + EDGE_EPSILON).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < -EDGE_EPSILON || u + v > 1.0 + EDGE_EPSILON {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t > RAY_EPSILON).then_some(t)
    }
}

/// A single ray intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point, in world units.
    pub distance: f32,
    /// World-space position of the hit point.
    pub point: Vec3,
}

/// Cast a world-space ray against geometry placed by `matrix`.
///
/// Every triangle is tested double-sided. Hits are returned in world space,
/// sorted nearest first. A degenerate ray or a non-invertible matrix hits
/// nothing.
pub fn raycast_geometry(ray: &Ray, geometry: &Geometry, matrix: Mat4) -> Vec<RayHit> {
    if ray.is_degenerate() || matrix.determinant().abs() < f32::EPSILON {
        return Vec::new();
    }

    let inverse = matrix.inverse();
    // Local direction is left unnormalized so `t` maps straight back to world points.
    let local = Ray {
        origin: inverse.transform_point3(ray.origin),
        direction: inverse.transform_vector3(ray.direction),
    };

    let mut hits: Vec<RayHit> = geometry
        .triangles()
        .filter_map(|[a, b, c]| local.intersect_triangle(a, b, c))
        .map(|t| {
            let point = matrix.transform_point3(local.point_at(t));
            RayHit {
                distance: point.distance(ray.origin),
                point,
            }
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Find the nearest visible marker under a ray.
///
/// Each marker is treated as a sphere of radius `size / 2` around its world
/// position.
pub fn pick_marker(world: &hecs::World, ray: &Ray) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;

    for (entity, (marker, visible)) in world.query::<(&Marker, &Visible)>().iter() {
        if !visible.0 {
            continue;
        }
        let center = world_matrix(world, entity).transform_point3(Vec3::ZERO);
        if let Some(distance) = ray.intersect_sphere(center, marker.size * 0.5) {
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((entity, distance));
            }
        }
    }

    best.map(|(entity, _)| entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Transform;

    #[test]
    fn triangle_hit_from_both_sides() {
        let a = Vec3::new(-1.0, -1.0, 0.0);
        let b = Vec3::new(1.0, -1.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);

        let front = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let back = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        assert!((front.intersect_triangle(a, b, c).unwrap() - 5.0).abs() < 1e-5);
        assert!((back.intersect_triangle(a, b, c).unwrap() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn triangle_miss_outside_edges() {
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = ray.intersect_triangle(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn sphere_intersection_from_inside_returns_far_wall() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let t = ray.intersect_sphere(Vec3::ZERO, 10.0).unwrap();
        assert!((t - 10.0).abs() < 1e-5);
    }

    #[test]
    fn raycast_respects_mirrored_translated_matrix() {
        let sphere = Geometry::sphere(100.0, 60, 40);
        let matrix = Transform::new()
            .position(Vec3::new(50.0, 0.0, 0.0))
            .scale(Vec3::new(-1.0, 1.0, 1.0))
            .matrix();
        let ray = Ray::new(Vec3::new(50.0, 0.0, 0.0), Vec3::new(-1.0, 0.03, 0.02));

        let hits = raycast_geometry(&ray, &sphere, matrix);
        let far = hits.last().unwrap();
        assert!(far.distance <= 100.0 + 1e-3);
        assert!(far.distance > 99.0);
        assert!((far.point - ray.point_at(far.distance)).length() < 1e-2);
    }

    #[test]
    fn sliver_triangle_is_never_hit() {
        // Two nearly coincident corners, like a collapsed pole ring
        let a = Vec3::new(0.0, -100.0, 0.0);
        let b = Vec3::new(9e-7, -100.0, 1e-7);
        let c = Vec3::new(7.8, -99.7, 0.8);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        assert!(ray.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn rays_through_the_poles_stay_on_the_sphere() {
        for radius in [100.0, 12.5] {
            let sphere = Geometry::sphere(radius, 60, 40);
            let mirrored = Transform::new().scale(Vec3::new(-1.0, 1.0, 1.0)).matrix();
            for matrix in [Mat4::IDENTITY, mirrored] {
                for direction in [Vec3::Y, Vec3::NEG_Y] {
                    let ray = Ray::new(Vec3::ZERO, direction);
                    let hits = raycast_geometry(&ray, &sphere, matrix);

                    let far = hits.last().unwrap();
                    assert!(
                        far.distance <= radius * (1.0 + 1e-4),
                        "hit at {} beyond radius {radius}",
                        far.distance
                    );
                    assert!(far.distance > radius * 0.99);
                    assert!(far.point.normalize().dot(direction) > 0.999);
                }
            }
        }
    }

    #[test]
    fn degenerate_ray_hits_nothing() {
        let sphere = Geometry::sphere(10.0, 8, 4);
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(raycast_geometry(&ray, &sphere, Mat4::IDENTITY).is_empty());
    }

    #[test]
    fn hits_are_sorted_nearest_first() {
        let sphere = Geometry::sphere(10.0, 16, 8);
        let ray = Ray::new(Vec3::new(0.3, 0.2, -50.0), Vec3::Z);
        let hits = raycast_geometry(&ray, &sphere, Mat4::IDENTITY);
        assert!(hits.len() >= 2);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }
}
