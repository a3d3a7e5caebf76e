//! Navigation links between panoramas.
//!
//! A link is a pair of markers, one inside each panorama, placed where the
//! line between the two centers leaves the panorama's own surface.

use glam::Vec3;
use hecs::Entity;

use super::world::PanoramaWorld;
use crate::ecs::world_matrix;
use crate::error::{LinkError, PanoramaError};
use crate::marker::{ClickAction, Icon, Marker};
use crate::mesh::Transform;
use crate::picking::{Ray, raycast_geometry};

/// Markers sit this fraction of the way from the center to the surface hit,
/// keeping them off the sphere itself.
const LINK_INSET: f32 = 0.99;

/// The two markers created by [`PanoramaWorld::link`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkedPair {
    /// Inside the first panorama, pointing at the second.
    pub forward: Entity,
    /// Inside the second panorama, pointing back at the first.
    pub backward: Entity,
}

/// Where a link marker goes, computed before anything is spawned.
struct Placement {
    local_position: Vec3,
    size: f32,
    icon: Icon,
    animation_duration: f32,
    show_now: bool,
}

impl PanoramaWorld {
    /// Link two panoramas in both directions.
    ///
    /// Each panorama gets a marker that, when clicked, asks the viewer to
    /// switch to the other one. Both placements are computed before either
    /// marker is created, so a failure leaves the scene untouched. Calling
    /// this again for the same pair adds another pair of markers.
    ///
    /// Failures are logged as warnings and returned; callers are free to
    /// ignore them.
    pub fn link(&mut self, from: Entity, to: Entity) -> Result<LinkedPair, PanoramaError> {
        let forward = self.placement(from, to)?;
        let backward = self.placement(to, from)?;

        Ok(LinkedPair {
            forward: self.insert_link(from, to, forward)?,
            backward: self.insert_link(to, from, backward)?,
        })
    }

    /// Create only the marker inside `from` that points at `to`.
    pub fn link_one_way(&mut self, from: Entity, to: Entity) -> Result<Entity, PanoramaError> {
        let placement = self.placement(from, to)?;
        self.insert_link(from, to, placement)
    }

    fn placement(&self, from: Entity, to: Entity) -> Result<Placement, PanoramaError> {
        let (size, animation_duration, show_now) = {
            let pano = self.panorama(from)?;
            (
                pano.default_infospot_size,
                pano.marker_animation_duration,
                pano.is_children_visible(),
            )
        };
        let icon = self
            .panorama(to)?
            .linking_image_url
            .clone()
            .map_or(Icon::Arrow, Icon::Image);

        let from_matrix = world_matrix(&self.world, from);
        let center = from_matrix.transform_point3(Vec3::ZERO);
        let target = world_matrix(&self.world, to).transform_point3(Vec3::ZERO);

        let offset = target - center;
        if offset.length() <= f32::EPSILON {
            log::warn!("[panorama] {}", LinkError::CoincidentPositions);
            return Err(LinkError::CoincidentPositions.into());
        }

        let ray = Ray::new(center, offset);
        let hits = {
            let geometry = self.geometry(from)?;
            raycast_geometry(&ray, &geometry, from_matrix)
        };
        let Some(far) = hits.last() else {
            log::warn!("[panorama] {}", LinkError::NoIntersection);
            return Err(LinkError::NoIntersection.into());
        };

        let world_point = center + (far.point - center) * LINK_INSET;
        Ok(Placement {
            local_position: from_matrix.inverse().transform_point3(world_point),
            size,
            icon,
            animation_duration,
            show_now,
        })
    }

    fn insert_link(
        &mut self,
        from: Entity,
        to: Entity,
        placement: Placement,
    ) -> Result<Entity, PanoramaError> {
        let mut marker = Marker::new(placement.size, placement.icon);
        marker.to_panorama = Some(to);
        marker.animation_duration = placement.animation_duration;
        marker.on_click = Some(ClickAction::RequestPanorama {
            panorama: from,
            target: to,
        });

        let transform = Transform::from_position(placement.local_position);
        let entity = self.spawn_marker(marker, transform);
        self.add(from, &[entity])?;
        self.panorama_mut(from)?.linked_spots.push(entity);
        if placement.show_now {
            self.show_marker(entity, 0.0)?;
        }

        log::debug!(
            "[panorama] Linked panorama {} -> {} with marker {}",
            from.id(),
            to.id(),
            entity.id()
        );
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanoramaConfig;
    use crate::geometry::Geometry;

    fn pair(world: &mut PanoramaWorld, b: Vec3) -> (Entity, Entity) {
        let config = PanoramaConfig::default();
        let a = world.spawn_panorama(&config, None);
        let other = world.spawn_panorama(&config, None);
        world.set_position(other, b).unwrap();
        (a, other)
    }

    #[test]
    fn marker_points_along_the_link() {
        let mut world = PanoramaWorld::new();
        let (a, b) = pair(&mut world, Vec3::new(50.0, 0.0, 0.0));

        let linked = world.link(a, b).unwrap();

        let forward = world_matrix(world.world(), linked.forward).transform_point3(Vec3::ZERO);
        assert!(forward.x > 90.0, "forward marker at {forward}");
        assert!(forward.y.abs() < 1e-3 && forward.z.abs() < 1e-3);

        let backward = world_matrix(world.world(), linked.backward).transform_point3(Vec3::ZERO);
        let from_b = backward - Vec3::new(50.0, 0.0, 0.0);
        assert!(from_b.x < -90.0, "backward marker at {backward}");
    }

    #[test]
    fn icon_comes_from_the_target() {
        let mut world = PanoramaWorld::new();
        let (a, b) = pair(&mut world, Vec3::new(0.0, 0.0, -30.0));
        world.set_linking_image(b, "door.png").unwrap();

        let linked = world.link(a, b).unwrap();

        assert_eq!(
            world.marker(linked.forward).unwrap().icon,
            Icon::Image("door.png".into())
        );
        assert_eq!(world.marker(linked.backward).unwrap().icon, Icon::Arrow);
    }

    #[test]
    fn self_link_is_coincident() {
        let mut world = PanoramaWorld::new();
        let a = world.spawn_panorama(&PanoramaConfig::default(), None);

        let err = world.link(a, a).unwrap_err();
        assert!(matches!(
            err,
            PanoramaError::Link(LinkError::CoincidentPositions)
        ));
        assert!(world.children(a).unwrap().is_empty());
    }

    #[test]
    fn empty_geometry_has_no_intersection() {
        let mut world = PanoramaWorld::new();
        let config = PanoramaConfig::default();
        let a = world.spawn_panorama_with(
            Some(Geometry::new(Vec::new(), Vec::new())),
            None,
            &config,
            None,
        );
        let b = world.spawn_panorama(&config, None);
        world.set_position(b, Vec3::new(10.0, 0.0, 0.0)).unwrap();

        let err = world.link(a, b).unwrap_err();
        assert!(matches!(err, PanoramaError::Link(LinkError::NoIntersection)));
        assert!(world.panorama(b).unwrap().linked_spots().is_empty());
    }

    #[test]
    fn one_way_link_leaves_target_alone() {
        let mut world = PanoramaWorld::new();
        let (a, b) = pair(&mut world, Vec3::new(0.0, 20.0, 0.0));

        let marker = world.link_one_way(a, b).unwrap();

        assert_eq!(world.panorama(a).unwrap().linked_spots(), &[marker]);
        assert!(world.panorama(b).unwrap().linked_spots().is_empty());
    }
}
