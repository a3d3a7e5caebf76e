//! Panoramas and the world that drives them.
//!
//! A panorama is a 360° surface (a sphere by default) seen from the inside.
//! It loads its image on demand, fades in and out as the viewer enters and
//! leaves it, and carries marker children, including navigation links to
//! other panoramas.
//!
//! # Overview
//!
//! - [`PanoramaWorld`] owns every entity, the shared [`Animator`] and the
//!   event queue. All lifecycle operations live on it.
//! - [`Panorama`] is the component holding load state and tunables.
//! - [`PanoramaEvent`]s are queued as things happen and drained by the viewer.
//!
//! # Example
//!
//! ```
//! use panosphere::{PanoramaConfig, PanoramaEventKind, PanoramaWorld, Vec3, ViewerRequest};
//!
//! let config = PanoramaConfig::default();
//! let mut world = PanoramaWorld::new();
//! let hall = world.spawn_panorama(&config, None);
//! let garden = world.spawn_panorama(&config, None);
//! world.set_position(garden, Vec3::new(50.0, 0.0, 0.0)).unwrap();
//!
//! let link = world.link(hall, garden).unwrap();
//! world.click_marker(link.forward).unwrap();
//!
//! let request = world.drain_events().pop().unwrap();
//! assert_eq!(
//!     request.kind,
//!     PanoramaEventKind::ViewerRequest(ViewerRequest::SetPanorama(garden))
//! );
//! ```

pub mod events;
pub mod link;
#[allow(clippy::module_inception)]
mod panorama;
pub mod transition;
mod world;

pub use events::{PanoramaEvent, PanoramaEventKind, ViewerRequest};
pub use link::LinkedPair;
pub use panorama::{ImageQuality, LoadState, Panorama};
pub use transition::{Animator, Easing, TweenEvent, TweenId, TweenKind, TweenSpec};
pub use world::PanoramaWorld;
