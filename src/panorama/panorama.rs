//! The panorama component and its image-quality levels.

use hecs::Entity;

use crate::config::PanoramaConfig;
use crate::panorama::transition::TweenId;
use crate::texture::PanoramaSource;

/// Texture resolution tiers, lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageQuality {
    Low = 1,
    Fair = 2,
    Medium = 3,
    High = 4,
    SuperHigh = 5,
}

impl ImageQuality {
    /// Pick a tier for a viewport width in pixels.
    ///
    /// ```
    /// use panosphere::ImageQuality;
    ///
    /// assert_eq!(ImageQuality::for_viewport_width(640), ImageQuality::Medium);
    /// assert_eq!(ImageQuality::for_viewport_width(1280), ImageQuality::High);
    /// assert_eq!(ImageQuality::for_viewport_width(2560), ImageQuality::SuperHigh);
    /// ```
    pub fn for_viewport_width(width: u32) -> Self {
        if width >= 1920 {
            ImageQuality::SuperHigh
        } else if width > 800 {
            ImageQuality::High
        } else {
            ImageQuality::Medium
        }
    }
}

/// Where a panorama is in its load lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Unloaded,
    /// A request is out with the loader.
    Loading,
    Loaded,
}

/// Panorama component: lifecycle bookkeeping and tunables.
///
/// Geometry, material, transform and visibility live in sibling components
/// on the same entity.
#[derive(Clone, Debug)]
pub struct Panorama {
    pub orbit_radius: f32,
    /// Seconds. Used for fades, the enter delay and the hold transitions.
    pub animation_duration: f32,
    pub default_infospot_size: f32,
    /// Declared for texture caches; not enforced here.
    pub max_cache_texture_number: usize,
    pub marker_animation_duration: f32,
    /// Icon other panoramas use for markers that link *to* this one.
    pub linking_image_url: Option<String>,
    pub source: Option<PanoramaSource>,

    pub(crate) load_state: LoadState,
    pub(crate) loaded: bool,
    pub(crate) is_children_visible: bool,
    pub(crate) linked_spots: Vec<Entity>,
    /// Bumped by every `on_enter`/`on_leave`; older transitions go quiet.
    pub(crate) generation: u64,
    pub(crate) transition: Option<TweenId>,
    pub(crate) fade: Option<TweenId>,
}

impl Panorama {
    pub fn new(config: &PanoramaConfig, source: Option<PanoramaSource>) -> Self {
        Self {
            orbit_radius: config.orbit_radius,
            animation_duration: config.animation_duration,
            default_infospot_size: config.default_infospot_size,
            max_cache_texture_number: config.max_cache_texture_number,
            marker_animation_duration: config.marker_animation_duration,
            linking_image_url: None,
            source,
            load_state: LoadState::Unloaded,
            loaded: false,
            is_children_visible: false,
            linked_spots: Vec::new(),
            generation: 0,
            transition: None,
            fade: None,
        }
    }

    /// True once content has loaded. Never reset.
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_children_visible(&self) -> bool {
        self.is_children_visible
    }

    /// Markers created by `link`, in creation order.
    pub fn linked_spots(&self) -> &[Entity] {
        &self.linked_spots
    }

    /// Whether an enter or leave transition is scheduled or running.
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }
}
