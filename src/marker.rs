//! Markers (infospots): clickable hotspots attached to panoramas.
//!
//! A marker shows and hides with a short opacity fade. Navigation markers
//! created by [`PanoramaWorld::link`] carry a [`ClickAction`] that asks the
//! viewer to switch panoramas instead of switching anything themselves.

use hecs::Entity;

use crate::ecs::Visible;
use crate::error::PanoramaError;
use crate::panorama::events::{PanoramaEventKind, ViewerRequest};
use crate::panorama::transition::{Easing, TweenId, TweenKind, TweenSpec};
use crate::panorama::PanoramaWorld;

/// Default show/hide fade for markers, in seconds.
pub const DEFAULT_MARKER_ANIMATION_DURATION: f32 = 0.5;

/// Image drawn for a marker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Icon {
    /// The built-in navigation arrow.
    #[default]
    Arrow,
    /// A custom image, by URL or path.
    Image(String),
}

/// What clicking a marker does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickAction {
    /// Ask the viewer, through `panorama`'s event stream, to show `target`.
    RequestPanorama { panorama: Entity, target: Entity },
}

/// Marker component.
#[derive(Clone, Debug)]
pub struct Marker {
    pub size: f32,
    pub icon: Icon,
    /// Panorama this marker navigates to. Not owned.
    pub to_panorama: Option<Entity>,
    /// Current fade opacity.
    pub opacity: f32,
    /// Seconds a show or hide fade takes.
    pub animation_duration: f32,
    pub on_click: Option<ClickAction>,
    shown: bool,
    tween: Option<TweenId>,
}

impl Marker {
    /// A hidden marker of the given size and icon.
    pub fn new(size: f32, icon: Icon) -> Self {
        Self {
            size,
            icon,
            to_panorama: None,
            opacity: 0.0,
            animation_duration: DEFAULT_MARKER_ANIMATION_DURATION,
            on_click: None,
            shown: false,
            tween: None,
        }
    }

    /// Whether the last request was `show`. The fade may still be running.
    pub fn is_shown(&self) -> bool {
        self.shown
    }
}

impl PanoramaWorld {
    /// Show a marker after `delay` seconds, fading it in.
    pub fn show_marker(&mut self, marker: Entity, delay: f32) -> Result<(), PanoramaError> {
        self.fade_marker(marker, true, delay)
    }

    /// Hide a marker after `delay` seconds, fading it out.
    pub fn hide_marker(&mut self, marker: Entity, delay: f32) -> Result<(), PanoramaError> {
        self.fade_marker(marker, false, delay)
    }

    fn fade_marker(
        &mut self,
        entity: Entity,
        showing: bool,
        delay: f32,
    ) -> Result<(), PanoramaError> {
        let marker = self
            .world
            .query_one_mut::<&mut Marker>(entity)
            .map_err(|_| PanoramaError::NotAMarker(entity))?;

        if let Some(previous) = marker.tween.take() {
            self.animator.cancel(previous);
        }
        marker.shown = showing;
        let to = if showing { 1.0 } else { 0.0 };
        let spec = TweenSpec::new(
            entity,
            TweenKind::MarkerFade { showing },
            marker.opacity,
            to,
            marker.animation_duration,
        )
        .delay(delay)
        .easing(Easing::QuarticOut);
        marker.tween = Some(self.animator.schedule(spec));
        Ok(())
    }

    /// Apply a marker fade notification from the animator.
    ///
    /// Notifications from a fade that has since been replaced are ignored.
    pub(crate) fn apply_marker_fade(
        &mut self,
        entity: Entity,
        id: TweenId,
        showing: bool,
        phase: MarkerFadePhase,
    ) -> Result<(), PanoramaError> {
        let (marker, visible) = self
            .world
            .query_one_mut::<(&mut Marker, &mut Visible)>(entity)
            .map_err(|_| PanoramaError::NotAMarker(entity))?;
        if marker.tween != Some(id) {
            return Ok(());
        }
        match phase {
            MarkerFadePhase::Started if showing => visible.0 = true,
            MarkerFadePhase::Started => {}
            MarkerFadePhase::Updated(value) => marker.opacity = value,
            MarkerFadePhase::Completed => {
                marker.tween = None;
                if !showing {
                    visible.0 = false;
                }
            }
        }
        Ok(())
    }

    /// Activate a marker as if it had been clicked.
    ///
    /// Navigation markers emit a [`ViewerRequest::SetPanorama`] on the
    /// panorama that owns them. Returns `Ok(false)` if the marker has no action.
    pub fn click_marker(&mut self, entity: Entity) -> Result<bool, PanoramaError> {
        let action = self
            .world
            .get::<&Marker>(entity)
            .map_err(|_| PanoramaError::NotAMarker(entity))?
            .on_click;

        match action {
            Some(ClickAction::RequestPanorama { panorama, target }) => {
                self.emit(
                    panorama,
                    PanoramaEventKind::ViewerRequest(ViewerRequest::SetPanorama(target)),
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Phase of a marker fade, extracted from a tween notification.
#[derive(Clone, Copy, Debug)]
pub(crate) enum MarkerFadePhase {
    Started,
    Updated(f32),
    Completed,
}
