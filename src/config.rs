//! Panorama tunables with TOML preset support.
//!
//! Every field has a default, so a partial file (say, only `orbit_radius`)
//! is valid. Durations are in seconds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PanoramaError;

/// Construction-time and instance-level settings for a panorama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanoramaConfig {
    /// Minimum viewing-sphere radius. Sizes the default sphere and is the
    /// scale reference for link placement.
    pub orbit_radius: f32,
    /// Length of fades and of the enter/leave hold transitions, in seconds.
    pub animation_duration: f32,
    /// Size given to markers created by `link`.
    pub default_infospot_size: f32,
    /// Texture cache budget. Declared for loaders; not enforced here.
    pub max_cache_texture_number: usize,
    /// Horizontal segments of the default sphere.
    pub width_segments: u32,
    /// Vertical segments of the default sphere.
    pub height_segments: u32,
    /// Show/hide fade length for markers, in seconds.
    pub marker_animation_duration: f32,
}

impl Default for PanoramaConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 100.0,
            animation_duration: 0.5,
            default_infospot_size: 7.0,
            max_cache_texture_number: 5,
            width_segments: 60,
            height_segments: 40,
            marker_animation_duration: 0.5,
        }
    }
}

impl PanoramaConfig {
    /// Set the orbit radius.
    pub fn orbit_radius(mut self, radius: f32) -> Self {
        self.orbit_radius = radius;
        self
    }

    /// Set the enter/leave/fade duration in seconds.
    pub fn animation_duration(mut self, seconds: f32) -> Self {
        self.animation_duration = seconds;
        self
    }

    /// Parse a config from TOML text. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, PanoramaError> {
        toml::from_str(content).map_err(|e| PanoramaError::ConfigParse(e.to_string()))
    }

    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, PanoramaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save the config to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), PanoramaError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PanoramaError::ConfigSerialize(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
