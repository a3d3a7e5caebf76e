//! Error types for panorama operations.

use hecs::Entity;
use thiserror::Error;

/// Reasons a [`link`](crate::PanoramaWorld::link) between two panoramas can fail.
///
/// Both variants leave the scene untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The two panoramas sit at the same point, so there is no direction to cast along.
    #[error("Panoramas should be at different position")]
    CoincidentPositions,
    /// The ray toward the other panorama never crosses this panorama's surface.
    #[error("No intersection with the panorama surface")]
    NoIntersection,
}

/// Errors returned by [`PanoramaWorld`](crate::PanoramaWorld) and the config layer.
#[derive(Error, Debug)]
pub enum PanoramaError {
    #[error("Entity {0:?} is not a panorama")]
    NotAPanorama(Entity),
    #[error("Entity {0:?} is not a marker")]
    NotAMarker(Entity),
    #[error("Entity {0:?} is not a scene node")]
    NotANode(Entity),
    #[error("Link failed: {0}")]
    Link(#[from] LinkError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
