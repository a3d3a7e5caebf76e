//! Surface material state for panoramas.

use crate::texture::Texture;

/// Which faces of a surface are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Render state a panorama owns and animates.
///
/// The renderer reads these fields; the core only writes `opacity` (through
/// fades) and `map` (when a load delivers a texture).
#[derive(Clone, Debug)]
pub struct Material {
    /// Current opacity in `[0, 1]`.
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
    pub depth_write: bool,
    pub depth_test: bool,
    /// The panorama image, once loaded.
    pub map: Option<Texture>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            depth_write: true,
            depth_test: true,
            map: None,
        }
    }
}

impl Material {
    /// A fully transparent material, ready to be faded in.
    pub fn transparent() -> Self {
        Self {
            opacity: 0.0,
            transparent: true,
            ..Default::default()
        }
    }

    /// Applies the render state every panorama surface needs, whatever
    /// material it was given: double-sided, no depth write, no depth test.
    pub fn into_panorama_surface(mut self) -> Self {
        self.side = Side::Double;
        self.depth_write = false;
        self.depth_test = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panorama_surface_keeps_opacity_and_map() {
        let material = Material {
            opacity: 0.3,
            ..Default::default()
        }
        .into_panorama_surface();

        assert_eq!(material.opacity, 0.3);
        assert_eq!(material.side, Side::Double);
        assert!(!material.depth_write);
        assert!(!material.depth_test);
        assert!(material.map.is_none());
    }
}
