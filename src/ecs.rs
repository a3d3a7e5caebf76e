//! Scene-graph components on top of `hecs`.
//!
//! Every node in a [`PanoramaWorld`](crate::PanoramaWorld) is an entity with a
//! [`Transform`](crate::Transform), a [`Visible`] flag and a [`Children`] list.
//! Attached nodes also carry a [`Parent`]. Parents own their children:
//! despawning is always done top-down by the world, never by a child.

use glam::Mat4;
use hecs::{Entity, World};

use crate::mesh::Transform;

/// Back-reference from a child node to the node it is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Ordered children of a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Children(pub Vec<Entity>);

/// Whether the node (and, for a renderer, its subtree) is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visible(pub bool);

impl Default for Visible {
    fn default() -> Self {
        Self(true)
    }
}

/// Spawn a bare, unattached node.
pub fn spawn_node(world: &mut World, transform: Transform) -> Entity {
    world.spawn((transform, Visible::default(), Children::default()))
}

/// Whether `entity` is a node (has the hierarchy components).
pub fn is_node(world: &World, entity: Entity) -> bool {
    world.satisfies::<(&Transform, &Children)>(entity).unwrap_or(false)
}

/// Attach `child` under `parent`, detaching it from any previous parent.
///
/// Returns `false` without changes if either entity is not a node, if they are
/// the same entity, or if `parent` sits inside `child`'s subtree.
pub fn attach(world: &mut World, parent: Entity, child: Entity) -> bool {
    if parent == child || !is_node(world, parent) || !is_node(world, child) {
        return false;
    }
    if descendants(world, child).contains(&parent) {
        return false;
    }

    detach(world, child);

    if world.insert_one(child, Parent(parent)).is_err() {
        return false;
    }
    if let Ok(children) = world.query_one_mut::<&mut Children>(parent) {
        children.0.push(child);
    }
    true
}

/// Detach `child` from its parent, if any. The child stays alive.
pub fn detach(world: &mut World, child: Entity) {
    let Ok(Parent(old)) = world.remove_one::<Parent>(child) else {
        return;
    };
    if let Ok(children) = world.query_one_mut::<&mut Children>(old) {
        children.0.retain(|&c| c != child);
    }
}

/// Detach every direct child of `parent`, returning them in order.
pub fn detach_children(world: &mut World, parent: Entity) -> Vec<Entity> {
    let removed = match world.query_one_mut::<&mut Children>(parent) {
        Ok(children) => std::mem::take(&mut children.0),
        Err(_) => return Vec::new(),
    };
    for &child in &removed {
        let _ = world.remove_one::<Parent>(child);
    }
    removed
}

/// Depth-first pre-order traversal of `root`'s subtree, `root` first.
///
/// Returns an empty list if `root` is not a node.
pub fn descendants(world: &World, root: Entity) -> Vec<Entity> {
    if !is_node(world, root) {
        return Vec::new();
    }

    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        order.push(entity);
        if let Ok(children) = world.get::<&Children>(entity) {
            // Reverse so the first child is visited first
            stack.extend(children.0.iter().rev().copied());
        }
    }
    order
}

/// The full local-to-world matrix of a node, following its parents.
pub fn world_matrix(world: &World, entity: Entity) -> Mat4 {
    let mut matrix = Mat4::IDENTITY;
    let mut current = Some(entity);
    while let Some(e) = current {
        if let Ok(transform) = world.get::<&Transform>(e) {
            matrix = transform.matrix() * matrix;
        }
        current = world.get::<&Parent>(e).ok().map(|p| p.0);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn descendants_are_depth_first_preorder() {
        let mut world = World::new();
        let root = spawn_node(&mut world, Transform::new());
        let a = spawn_node(&mut world, Transform::new());
        let a1 = spawn_node(&mut world, Transform::new());
        let b = spawn_node(&mut world, Transform::new());

        assert!(attach(&mut world, root, a));
        assert!(attach(&mut world, a, a1));
        assert!(attach(&mut world, root, b));

        assert_eq!(descendants(&world, root), vec![root, a, a1, b]);
    }

    #[test]
    fn attach_rejects_cycles() {
        let mut world = World::new();
        let a = spawn_node(&mut world, Transform::new());
        let b = spawn_node(&mut world, Transform::new());
        assert!(attach(&mut world, a, b));
        assert!(!attach(&mut world, b, a));
        assert!(!attach(&mut world, a, a));
    }

    #[test]
    fn attach_rejects_despawned_child() {
        let mut world = World::new();
        let parent = spawn_node(&mut world, Transform::new());
        let child = spawn_node(&mut world, Transform::new());
        world.despawn(child).unwrap();

        assert!(!attach(&mut world, parent, child));
        assert!(world.get::<&Children>(parent).unwrap().0.is_empty());
    }

    #[test]
    fn reattach_moves_child() {
        let mut world = World::new();
        let a = spawn_node(&mut world, Transform::new());
        let b = spawn_node(&mut world, Transform::new());
        let child = spawn_node(&mut world, Transform::new());

        attach(&mut world, a, child);
        attach(&mut world, b, child);

        assert!(world.get::<&Children>(a).unwrap().0.is_empty());
        assert_eq!(world.get::<&Children>(b).unwrap().0, vec![child]);
        assert_eq!(*world.get::<&Parent>(child).unwrap(), Parent(b));
    }

    #[test]
    fn detach_children_keeps_entities_alive() {
        let mut world = World::new();
        let root = spawn_node(&mut world, Transform::new());
        let child = spawn_node(&mut world, Transform::new());
        attach(&mut world, root, child);

        let removed = detach_children(&mut world, root);
        assert_eq!(removed, vec![child]);
        assert!(world.contains(child));
        assert!(world.get::<&Parent>(child).is_err());
        assert_eq!(descendants(&world, root), vec![root]);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut world = World::new();
        let root = spawn_node(
            &mut world,
            Transform::from_position(Vec3::new(10.0, 0.0, 0.0)).scale(Vec3::new(-1.0, 1.0, 1.0)),
        );
        let child = spawn_node(&mut world, Transform::from_position(Vec3::new(3.0, 1.0, 0.0)));
        attach(&mut world, root, child);

        let p = world_matrix(&world, child).transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(7.0, 1.0, 0.0)).length() < 1e-5);
    }
}
