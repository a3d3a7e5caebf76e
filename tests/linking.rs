use panosphere::{
    Entity, LinkError, PanoramaConfig, PanoramaError, PanoramaEventKind, PanoramaWorld, Ray, Vec3,
    ViewerRequest, pick_marker, world_matrix,
};

fn two_panoramas(config: &PanoramaConfig, b_at: Vec3) -> (PanoramaWorld, Entity, Entity) {
    let mut world = PanoramaWorld::new();
    let a = world.spawn_panorama(config, None);
    let b = world.spawn_panorama(config, None);
    world.set_position(b, b_at).unwrap();
    (world, a, b)
}

fn world_position(world: &PanoramaWorld, entity: Entity) -> Vec3 {
    world_matrix(world.world(), entity).transform_point3(Vec3::ZERO)
}

#[test]
fn link_creates_one_marker_on_each_side() {
    let config = PanoramaConfig::default();
    let (mut world, a, b) = two_panoramas(&config, Vec3::new(50.0, 0.0, 0.0));

    let link = world.link(a, b).unwrap();

    assert_eq!(world.panorama(a).unwrap().linked_spots(), &[link.forward]);
    assert_eq!(world.panorama(b).unwrap().linked_spots(), &[link.backward]);
    assert_eq!(world.children(a).unwrap(), vec![link.forward]);
    assert_eq!(world.children(b).unwrap(), vec![link.backward]);
    assert_eq!(world.marker(link.forward).unwrap().to_panorama, Some(b));
    assert_eq!(world.marker(link.backward).unwrap().to_panorama, Some(a));
    assert_eq!(world.marker(link.forward).unwrap().size, 7.0);
}

#[test]
fn linking_again_appends_another_pair() {
    let config = PanoramaConfig::default();
    let (mut world, a, b) = two_panoramas(&config, Vec3::new(50.0, 0.0, 0.0));

    let first = world.link(a, b).unwrap();
    let second = world.link(a, b).unwrap();

    assert_ne!(first, second);
    assert_eq!(
        world.panorama(a).unwrap().linked_spots(),
        &[first.forward, second.forward]
    );
    assert_eq!(
        world.panorama(b).unwrap().linked_spots(),
        &[first.backward, second.backward]
    );
}

#[test]
fn coincident_panoramas_are_not_linked() {
    let config = PanoramaConfig::default();
    let (mut world, a, b) = two_panoramas(&config, Vec3::ZERO);
    let entities_before = world.world().len();

    let err = world.link(a, b).unwrap_err();

    assert!(matches!(
        err,
        PanoramaError::Link(LinkError::CoincidentPositions)
    ));
    assert_eq!(err.to_string(), "Link failed: Panoramas should be at different position");
    for pano in [a, b] {
        assert!(world.panorama(pano).unwrap().linked_spots().is_empty());
        assert!(world.children(pano).unwrap().is_empty());
    }
    assert_eq!(world.world().len(), entities_before);
}

#[test]
fn markers_sit_just_inside_the_surface() {
    for radius in [100.0, 12.5] {
        let config = PanoramaConfig::default().orbit_radius(radius);
        for direction in [
            Vec3::new(50.0, 0.0, 0.0),
            Vec3::new(-3.0, 7.0, 2.0),
            Vec3::new(0.0, -40.0, 0.0),
            Vec3::new(0.0, 30.0, 0.0),
            Vec3::new(10.0, 10.0, -10.0),
        ] {
            let (mut world, a, b) = two_panoramas(&config, direction);
            let link = world.link(a, b).unwrap();

            let forward = world_position(&world, link.forward);
            let distance = forward.length();
            assert!(distance < radius, "{distance} not inside {radius}");
            assert!(distance > radius * 0.9, "{distance} too far from {radius}");
            assert!(
                forward.normalize().dot(direction.normalize()) > 0.999,
                "marker {forward} off the line toward {direction}"
            );

            let backward = world_position(&world, link.backward) - direction;
            assert!(backward.length() < radius);
            assert!(backward.normalize().dot(-direction.normalize()) > 0.999);
        }
    }
}

#[test]
fn link_markers_are_mirrored_children() {
    let config = PanoramaConfig::default();
    let (mut world, a, b) = two_panoramas(&config, Vec3::new(0.0, 0.0, 80.0));

    let link = world.link(a, b).unwrap();

    assert_eq!(world.transform(link.forward).unwrap().scale.x, -1.0);
    assert!(!world.is_visible(link.forward).unwrap());
}

#[test]
fn link_into_visible_panorama_shows_marker() {
    let config = PanoramaConfig::default();
    let (mut world, a, b) = two_panoramas(&config, Vec3::new(0.0, 0.0, 80.0));
    world.toggle_children_visibility(a, Some(true), 0.0).unwrap();

    let link = world.link(a, b).unwrap();
    world.update(1.0);

    assert!(world.is_visible(link.forward).unwrap());
    assert!(world.marker(link.forward).unwrap().is_shown());
    assert!(!world.is_visible(link.backward).unwrap());
}

#[test]
fn clicking_a_link_asks_the_viewer_to_switch() {
    let config = PanoramaConfig::default();
    let (mut world, a, b) = two_panoramas(&config, Vec3::new(50.0, 0.0, 0.0));
    let link = world.link(a, b).unwrap();

    assert!(world.click_marker(link.forward).unwrap());
    assert!(world.click_marker(link.backward).unwrap());

    let events = world.drain_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].panorama, a);
    assert_eq!(
        events[0].kind,
        PanoramaEventKind::ViewerRequest(ViewerRequest::SetPanorama(b))
    );
    assert_eq!(events[1].panorama, b);
    assert_eq!(events[1].kind.name(), "panolens-viewer-handler");
    assert!(events[1].to_string().starts_with("panolens-viewer-handler panorama="));
    // The click itself switches nothing
    assert!(!world.panorama(b).unwrap().is_transitioning());
}

#[test]
fn shown_link_marker_can_be_picked() {
    let config = PanoramaConfig::default();
    let (mut world, a, b) = two_panoramas(&config, Vec3::new(50.0, 0.0, 0.0));
    let link = world.link(a, b).unwrap();

    let ray = Ray::new(Vec3::ZERO, Vec3::X);
    assert_eq!(pick_marker(world.world(), &ray), None);

    world.toggle_children_visibility(a, Some(true), 0.0).unwrap();
    world.update(0.1);
    assert_eq!(pick_marker(world.world(), &ray), Some(link.forward));

    let away = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
    assert_eq!(pick_marker(world.world(), &away), None);
}

#[test]
fn offset_panoramas_link_in_world_space() {
    let config = PanoramaConfig::default();
    let mut world = PanoramaWorld::new();
    let a = world.spawn_panorama(&config, None);
    let b = world.spawn_panorama(&config, None);
    world.set_position(a, Vec3::new(-20.0, 5.0, 0.0)).unwrap();
    world.set_position(b, Vec3::new(30.0, 5.0, 0.0)).unwrap();

    let link = world.link(a, b).unwrap();

    let forward = world_position(&world, link.forward) - Vec3::new(-20.0, 5.0, 0.0);
    assert!(forward.x > 90.0 && forward.x < 100.0, "{forward}");
    assert!(forward.y.abs() < 1e-3);
}
