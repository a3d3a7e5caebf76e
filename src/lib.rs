//! # Panosphere
//!
//! **Panorama scene nodes for 360° tours.**
//!
//! Each panorama is a sphere seen from the inside. It loads its image on
//! demand, fades in and out as the viewer enters and leaves, shows and hides
//! its hotspot markers, and links to neighbouring panoramas through markers
//! placed by casting a ray against its own surface.
//!
//! ## Quick Start
//!
//! ```
//! use panosphere::*;
//!
//! let config = PanoramaConfig::default();
//! let mut world = PanoramaWorld::new();
//!
//! let lobby = world.spawn_panorama(&config, None);
//! let stairs = world.spawn_panorama(&config, None);
//! world.set_position(stairs, Vec3::new(0.0, 0.0, -40.0)).unwrap();
//! world.link(lobby, stairs).unwrap();
//!
//! world.on_enter(lobby).unwrap();
//! for _ in 0..90 {
//!     world.update(1.0 / 60.0);
//! }
//!
//! let names: Vec<_> = world.drain_events().iter().map(|e| e.kind.name()).collect();
//! assert_eq!(names, ["enter", "enter-start", "load"]);
//! ```
//!
//! Nothing runs by itself: the host calls [`PanoramaWorld::update`] once per
//! frame, and a viewer drains [`PanoramaEvent`]s to react to loads, errors
//! and navigation requests.

mod config;
mod ecs;
mod error;
mod geometry;
mod marker;
mod material;
mod mesh;
pub mod panorama;
mod picking;
mod texture;

pub use config::PanoramaConfig;
pub use error::{LinkError, PanoramaError};
pub use geometry::Geometry;
pub use marker::{ClickAction, DEFAULT_MARKER_ANIMATION_DURATION, Icon, Marker};
pub use material::{Material, Side};
pub use mesh::{Transform, Vertex3d};
pub use panorama::{
    Animator, Easing, ImageQuality, LinkedPair, LoadState, Panorama, PanoramaEvent,
    PanoramaEventKind, PanoramaWorld, TweenEvent, TweenId, TweenKind, TweenSpec, ViewerRequest,
};
pub use texture::{ImageLoader, LoadSignal, LoadSignalKind, PanoramaLoader, PanoramaSource, Texture};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec3};

// ECS support
pub use ecs::{Children, Parent, Visible, attach, descendants, world_matrix};
pub use hecs::{Entity, World};

// Picking
pub use picking::{Ray, RayHit, pick_marker, raycast_geometry};
