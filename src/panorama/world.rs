//! The panorama world: scene graph, animator, loader and event queue.

use glam::Vec3;
use hecs::{Entity, World};

use super::events::{PanoramaEvent, PanoramaEventKind};
use super::panorama::{LoadState, Panorama};
use super::transition::{Animator, Easing, TweenEvent, TweenId, TweenKind, TweenSpec};
use crate::config::PanoramaConfig;
use crate::ecs::{self, Children, Visible};
use crate::error::PanoramaError;
use crate::geometry::Geometry;
use crate::marker::{Marker, MarkerFadePhase};
use crate::material::Material;
use crate::mesh::Transform;
use crate::texture::{LoadSignalKind, PanoramaLoader, PanoramaSource, Texture};

/// Owns every panorama, marker and plain node, and drives their lifecycles.
///
/// Nothing happens on its own: the host calls [`update`](Self::update) once
/// per frame with the elapsed time, which polls the loader, advances the
/// animator and applies the results. Signals accumulate until
/// [`drain_events`](Self::drain_events).
///
/// # Example
///
/// ```
/// use panosphere::{PanoramaConfig, PanoramaEventKind, PanoramaWorld};
///
/// let mut world = PanoramaWorld::new();
/// let pano = world.spawn_panorama(&PanoramaConfig::default(), None);
///
/// world.on_enter(pano).unwrap();
/// assert_eq!(world.drain_events()[0].kind, PanoramaEventKind::Enter);
///
/// // After the enter delay the (source-less) panorama loads and fades in.
/// world.update(0.5);
/// world.update(0.5);
/// assert!(world.panorama(pano).unwrap().loaded());
/// assert_eq!(world.material(pano).unwrap().opacity, 1.0);
/// ```
pub struct PanoramaWorld {
    pub(crate) world: World,
    pub(crate) animator: Animator,
    loader: Option<Box<dyn PanoramaLoader>>,
    events: Vec<PanoramaEvent>,
}

impl Default for PanoramaWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PanoramaWorld {
    /// An empty world with its own animator and no loader.
    pub fn new() -> Self {
        Self {
            world: World::new(),
            animator: Animator::new(),
            loader: None,
            events: Vec::new(),
        }
    }

    /// Use the given animator for every transition.
    pub fn with_animator(mut self, animator: Animator) -> Self {
        self.animator = animator;
        self
    }

    /// Use the given loader for panoramas that have a source.
    pub fn with_loader(mut self, loader: impl PanoramaLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// The underlying ECS world, for renderers and custom queries.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the ECS world.
    ///
    /// Reparenting nodes directly bypasses the mirroring done by [`add`](Self::add).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Spawn a panorama on the default sphere with a transparent material.
    pub fn spawn_panorama(
        &mut self,
        config: &PanoramaConfig,
        source: Option<PanoramaSource>,
    ) -> Entity {
        self.spawn_panorama_with(None, None, config, source)
    }

    /// Spawn a panorama, optionally overriding geometry and material.
    ///
    /// Whatever material is given is made double-sided with depth write and
    /// depth test off. The panorama's X scale is negated so the surface's
    /// inside faces the viewer.
    pub fn spawn_panorama_with(
        &mut self,
        geometry: Option<Geometry>,
        material: Option<Material>,
        config: &PanoramaConfig,
        source: Option<PanoramaSource>,
    ) -> Entity {
        let geometry = geometry.unwrap_or_else(|| {
            Geometry::sphere(
                config.orbit_radius,
                config.width_segments,
                config.height_segments,
            )
        });
        let material = material
            .unwrap_or_else(Material::transparent)
            .into_panorama_surface();
        let mut transform = Transform::new();
        transform.mirror_x();

        let entity = self.world.spawn((
            Panorama::new(config, source),
            geometry,
            material,
            transform,
            Visible(true),
            Children::default(),
        ));
        log::debug!("[panorama] Spawned panorama {}", entity.id());
        entity
    }

    /// Spawn a plain, unattached scene node.
    pub fn spawn_object(&mut self, transform: Transform) -> Entity {
        ecs::spawn_node(&mut self.world, transform)
    }

    /// Spawn an unattached, hidden marker.
    pub fn spawn_marker(&mut self, marker: Marker, transform: Transform) -> Entity {
        self.world
            .spawn((marker, transform, Visible(false), Children::default()))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn panorama(&self, id: Entity) -> Result<hecs::Ref<'_, Panorama>, PanoramaError> {
        self.world
            .get::<&Panorama>(id)
            .map_err(|_| PanoramaError::NotAPanorama(id))
    }

    pub(crate) fn panorama_mut(&mut self, id: Entity) -> Result<&mut Panorama, PanoramaError> {
        self.world
            .query_one_mut::<&mut Panorama>(id)
            .map_err(|_| PanoramaError::NotAPanorama(id))
    }

    pub fn marker(&self, id: Entity) -> Result<hecs::Ref<'_, Marker>, PanoramaError> {
        self.world
            .get::<&Marker>(id)
            .map_err(|_| PanoramaError::NotAMarker(id))
    }

    pub fn material(&self, id: Entity) -> Result<hecs::Ref<'_, Material>, PanoramaError> {
        self.world
            .get::<&Material>(id)
            .map_err(|_| PanoramaError::NotAPanorama(id))
    }

    pub fn geometry(&self, id: Entity) -> Result<hecs::Ref<'_, Geometry>, PanoramaError> {
        self.world
            .get::<&Geometry>(id)
            .map_err(|_| PanoramaError::NotAPanorama(id))
    }

    pub fn transform(&self, id: Entity) -> Result<Transform, PanoramaError> {
        self.world
            .get::<&Transform>(id)
            .map(|t| *t)
            .map_err(|_| PanoramaError::NotANode(id))
    }

    pub fn is_visible(&self, id: Entity) -> Result<bool, PanoramaError> {
        self.world
            .get::<&Visible>(id)
            .map(|v| v.0)
            .map_err(|_| PanoramaError::NotANode(id))
    }

    /// Direct children of a node, in attachment order.
    pub fn children(&self, id: Entity) -> Result<Vec<Entity>, PanoramaError> {
        self.world
            .get::<&Children>(id)
            .map(|c| c.0.clone())
            .map_err(|_| PanoramaError::NotANode(id))
    }

    /// Move a node (typically a panorama) to a new local position.
    pub fn set_position(&mut self, id: Entity, position: Vec3) -> Result<(), PanoramaError> {
        let transform = self
            .world
            .query_one_mut::<&mut Transform>(id)
            .map_err(|_| PanoramaError::NotANode(id))?;
        transform.position = position;
        Ok(())
    }

    pub fn set_linking_image(
        &mut self,
        id: Entity,
        url: impl Into<String>,
    ) -> Result<(), PanoramaError> {
        self.panorama_mut(id)?.linking_image_url = Some(url.into());
        Ok(())
    }

    /// Replace the texture shown on the panorama surface.
    pub fn update_panorama_texture(
        &mut self,
        id: Entity,
        texture: Texture,
    ) -> Result<(), PanoramaError> {
        let material = self
            .world
            .query_one_mut::<&mut Material>(id)
            .map_err(|_| PanoramaError::NotAPanorama(id))?;
        material.map = Some(texture);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scene graph
    // ------------------------------------------------------------------

    /// Attach objects under a panorama.
    ///
    /// Each object, and every node already beneath it, has its X scale
    /// negated. Combined with the panorama's own mirrored scale this leaves
    /// attached content looking un-mirrored. Nothing is attached if any
    /// object is not a node or cannot be attached.
    pub fn add(&mut self, panorama: Entity, objects: &[Entity]) -> Result<(), PanoramaError> {
        self.panorama(panorama)?;
        if let Some(&bad) = objects.iter().find(|&&o| {
            !ecs::is_node(&self.world, o) || ecs::descendants(&self.world, o).contains(&panorama)
        }) {
            return Err(PanoramaError::NotANode(bad));
        }

        for &object in objects {
            if !ecs::attach(&mut self.world, panorama, object) {
                return Err(PanoramaError::NotANode(object));
            }
            for node in ecs::descendants(&self.world, object) {
                if let Ok(transform) = self.world.query_one_mut::<&mut Transform>(node) {
                    transform.mirror_x();
                }
            }
        }
        Ok(())
    }

    /// Detach every child of the panorama.
    ///
    /// The children stay alive. `loaded` and `linked_spots` are untouched,
    /// so linked markers remain addressable but no longer take part in
    /// visibility toggles. Returns the detached entities.
    pub fn reset(&mut self, panorama: Entity) -> Result<Vec<Entity>, PanoramaError> {
        self.panorama(panorama)?;
        let removed = ecs::detach_children(&mut self.world, panorama);
        log::debug!(
            "[panorama] Reset panorama {}, detached {} children",
            panorama.id(),
            removed.len()
        );
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------

    /// Show or hide every marker beneath the panorama.
    ///
    /// `force` picks the target; `None` flips the current state. Every
    /// marker gets the same target and `delay` (seconds) in one pass, and
    /// `is_children_visible` is updated even when there are no markers.
    /// Returns the new state.
    pub fn toggle_children_visibility(
        &mut self,
        panorama: Entity,
        force: Option<bool>,
        delay: f32,
    ) -> Result<bool, PanoramaError> {
        let visible = force.unwrap_or(!self.panorama(panorama)?.is_children_visible);

        let markers: Vec<Entity> = ecs::descendants(&self.world, panorama)
            .into_iter()
            .filter(|&e| self.world.satisfies::<&Marker>(e).unwrap_or(false))
            .collect();
        for marker in markers {
            if visible {
                self.show_marker(marker, delay)?;
            } else {
                self.hide_marker(marker, delay)?;
            }
        }

        self.panorama_mut(panorama)?.is_children_visible = visible;
        Ok(visible)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Start loading the panorama's content if it is not loaded or loading.
    ///
    /// A panorama without a source completes immediately.
    pub fn load(&mut self, panorama: Entity) -> Result<(), PanoramaError> {
        let pano = self.panorama_mut(panorama)?;
        match pano.load_state {
            LoadState::Loaded => return Ok(()),
            LoadState::Loading => {
                log::debug!("[panorama] Panorama {} is already loading", panorama.id());
                return Ok(());
            }
            LoadState::Unloaded => {}
        }
        pano.load_state = LoadState::Loading;
        let Some(source) = pano.source.clone() else {
            return self.on_load(panorama, None);
        };

        match self.loader.as_mut() {
            Some(loader) => {
                loader.request(panorama, &source);
                Ok(())
            }
            None => {
                log::warn!("[panorama] No loader configured for {:?}", source);
                self.on_error(panorama, "no loader configured")
            }
        }
    }

    /// Loader signal: content arrived.
    ///
    /// Reveals the markers, marks the panorama loaded and emits `Load`,
    /// whose handler fades the surface in. Ignored once already loaded.
    pub fn on_load(
        &mut self,
        panorama: Entity,
        texture: Option<Texture>,
    ) -> Result<(), PanoramaError> {
        if self.panorama(panorama)?.load_state == LoadState::Loaded {
            log::debug!("[panorama] Panorama {} is already loaded", panorama.id());
            return Ok(());
        }
        if let Some(texture) = texture {
            self.update_panorama_texture(panorama, texture)?;
        }
        self.toggle_children_visibility(panorama, Some(true), 0.0)?;

        let pano = self.panorama_mut(panorama)?;
        pano.loaded = true;
        pano.load_state = LoadState::Loaded;

        self.emit(panorama, PanoramaEventKind::Load);
        Ok(())
    }

    /// Loader signal: progress in `[0, 1]`.
    pub fn on_progress(&mut self, panorama: Entity, progress: f32) -> Result<(), PanoramaError> {
        self.panorama(panorama)?;
        self.emit(panorama, PanoramaEventKind::Progress(progress));
        Ok(())
    }

    /// Loader signal: loading failed. No retry is attempted.
    pub fn on_error(
        &mut self,
        panorama: Entity,
        reason: impl Into<String>,
    ) -> Result<(), PanoramaError> {
        let pano = self.panorama_mut(panorama)?;
        if pano.load_state == LoadState::Loading {
            pano.load_state = LoadState::Unloaded;
        }
        self.emit(panorama, PanoramaEventKind::Error(reason.into()));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Fades and transitions
    // ------------------------------------------------------------------

    /// Fade the surface to fully opaque over `animation_duration`.
    pub fn fade_in(&mut self, panorama: Entity) -> Result<(), PanoramaError> {
        self.fade_to(panorama, 1.0)
    }

    /// Fade the surface to fully transparent over `animation_duration`.
    pub fn fade_out(&mut self, panorama: Entity) -> Result<(), PanoramaError> {
        self.fade_to(panorama, 0.0)
    }

    fn fade_to(&mut self, panorama: Entity, target: f32) -> Result<(), PanoramaError> {
        let from = self.material(panorama)?.opacity;
        let pano = self.panorama_mut(panorama)?;
        let previous = pano.fade.take();
        let spec = TweenSpec::new(panorama, TweenKind::Fade, from, target, pano.animation_duration)
            .easing(Easing::QuarticOut);

        if let Some(previous) = previous {
            self.animator.cancel(previous);
        }
        let id = self.animator.schedule(spec);
        self.panorama_mut(panorama)?.fade = Some(id);
        Ok(())
    }

    /// Begin entering view.
    ///
    /// Emits `Enter` now. After `animation_duration` the transition starts:
    /// `EnterStart` fires, the panorama becomes visible, and either the
    /// surface fades in with markers following one `animation_duration`
    /// later, or, if not yet loaded, a load is requested instead.
    pub fn on_enter(&mut self, panorama: Entity) -> Result<(), PanoramaError> {
        let pano = self.panorama_mut(panorama)?;
        pano.generation += 1;
        let duration = pano.animation_duration;
        let spec = TweenSpec::hold(
            panorama,
            TweenKind::Enter {
                generation: pano.generation,
            },
            duration,
        )
        .delay(duration)
        .easing(Easing::QuarticOut);

        let id = self.animator.schedule(spec);
        self.panorama_mut(panorama)?.transition = Some(id);
        self.emit(panorama, PanoramaEventKind::Enter);
        Ok(())
    }

    /// Begin leaving view.
    ///
    /// Emits `Leave` now. The transition starts immediately, fading the
    /// surface out and hiding markers, and its completion hides the panorama.
    pub fn on_leave(&mut self, panorama: Entity) -> Result<(), PanoramaError> {
        let pano = self.panorama_mut(panorama)?;
        pano.generation += 1;
        let spec = TweenSpec::hold(
            panorama,
            TweenKind::Leave {
                generation: pano.generation,
            },
            pano.animation_duration,
        )
        .easing(Easing::QuarticOut);

        let id = self.animator.schedule(spec);
        self.panorama_mut(panorama)?.transition = Some(id);
        self.emit(panorama, PanoramaEventKind::Leave);
        Ok(())
    }

    fn enter_start(&mut self, panorama: Entity) -> Result<(), PanoramaError> {
        self.emit(panorama, PanoramaEventKind::EnterStart);

        let (loaded, duration) = {
            let pano = self.panorama(panorama)?;
            (pano.loaded, pano.animation_duration)
        };
        if loaded {
            self.fade_in(panorama)?;
            self.toggle_children_visibility(panorama, Some(true), duration)?;
        } else {
            self.load(panorama)?;
        }

        self.set_visible(panorama, true)
    }

    fn leave_start(&mut self, panorama: Entity) -> Result<(), PanoramaError> {
        self.fade_out(panorama)?;
        self.toggle_children_visibility(panorama, Some(false), 0.0)?;
        Ok(())
    }

    fn set_visible(&mut self, id: Entity, visible: bool) -> Result<(), PanoramaError> {
        let flag = self
            .world
            .query_one_mut::<&mut Visible>(id)
            .map_err(|_| PanoramaError::NotANode(id))?;
        flag.0 = visible;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events and ticking
    // ------------------------------------------------------------------

    /// Queue a signal. `Load` also triggers the panorama's own fade-in, the
    /// one subscription every panorama has from construction.
    pub(crate) fn emit(&mut self, panorama: Entity, kind: PanoramaEventKind) {
        let is_load = kind == PanoramaEventKind::Load;
        let event = PanoramaEvent { panorama, kind };
        log::debug!("[panorama] {}", event);
        self.events.push(event);

        if is_load {
            if let Err(e) = self.fade_in(panorama) {
                log::warn!("[panorama] Fade-in after load failed: {}", e);
            }
        }
    }

    /// Signals emitted since the last drain, oldest first.
    pub fn events(&self) -> &[PanoramaEvent] {
        &self.events
    }

    /// Take every queued signal, oldest first.
    pub fn drain_events(&mut self) -> Vec<PanoramaEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the world by `dt` seconds.
    ///
    /// Loader signals are applied first, then the animator steps and its
    /// notifications are applied in scheduling order.
    pub fn update(&mut self, dt: f32) {
        let signals = self
            .loader
            .as_mut()
            .map(|loader| loader.poll())
            .unwrap_or_default();
        for signal in signals {
            let result = match signal.kind {
                LoadSignalKind::Progress(progress) => self.on_progress(signal.panorama, progress),
                LoadSignalKind::Loaded(texture) => self.on_load(signal.panorama, Some(texture)),
                LoadSignalKind::Failed(reason) => self.on_error(signal.panorama, reason),
            };
            if let Err(e) = result {
                log::warn!("[panorama] Dropped loader signal: {}", e);
            }
        }

        for event in self.animator.update(dt) {
            if let Err(e) = self.apply_tween_event(event) {
                // Owner was despawned while its tween was in flight
                log::debug!("[panorama] Ignored tween event: {}", e);
            }
        }
    }

    fn apply_tween_event(&mut self, event: TweenEvent) -> Result<(), PanoramaError> {
        match event {
            TweenEvent::Updated {
                id,
                owner,
                kind: TweenKind::Fade,
                value,
            } => {
                if self.panorama(owner)?.fade == Some(id) {
                    let material = self
                        .world
                        .query_one_mut::<&mut Material>(owner)
                        .map_err(|_| PanoramaError::NotAPanorama(owner))?;
                    material.opacity = value;
                }
            }
            TweenEvent::Completed {
                id,
                owner,
                kind: TweenKind::Fade,
            } => {
                let pano = self.panorama_mut(owner)?;
                if pano.fade == Some(id) {
                    pano.fade = None;
                }
            }
            TweenEvent::Started {
                owner,
                kind: TweenKind::Enter { generation },
                ..
            } => {
                if self.is_current(owner, generation)? {
                    self.enter_start(owner)?;
                } else {
                    log::debug!("[panorama] Skipped superseded enter on {}", owner.id());
                }
            }
            TweenEvent::Started {
                owner,
                kind: TweenKind::Leave { generation },
                ..
            } => {
                if self.is_current(owner, generation)? {
                    self.leave_start(owner)?;
                } else {
                    log::debug!("[panorama] Skipped superseded leave on {}", owner.id());
                }
            }
            TweenEvent::Completed {
                id,
                owner,
                kind: TweenKind::Enter { .. },
            } => self.finish_transition(owner, id)?,
            TweenEvent::Completed {
                id,
                owner,
                kind: TweenKind::Leave { generation },
            } => {
                if self.is_current(owner, generation)? {
                    self.set_visible(owner, false)?;
                }
                self.finish_transition(owner, id)?;
            }
            TweenEvent::Started {
                id,
                owner,
                kind: TweenKind::MarkerFade { showing },
            } => self.apply_marker_fade(owner, id, showing, MarkerFadePhase::Started)?,
            TweenEvent::Updated {
                id,
                owner,
                kind: TweenKind::MarkerFade { showing },
                value,
            } => self.apply_marker_fade(owner, id, showing, MarkerFadePhase::Updated(value))?,
            TweenEvent::Completed {
                id,
                owner,
                kind: TweenKind::MarkerFade { showing },
            } => self.apply_marker_fade(owner, id, showing, MarkerFadePhase::Completed)?,
            TweenEvent::Started {
                kind: TweenKind::Fade,
                ..
            }
            | TweenEvent::Updated {
                kind: TweenKind::Enter { .. } | TweenKind::Leave { .. },
                ..
            } => {}
        }
        Ok(())
    }

    fn finish_transition(&mut self, panorama: Entity, id: TweenId) -> Result<(), PanoramaError> {
        let pano = self.panorama_mut(panorama)?;
        if pano.transition == Some(id) {
            pano.transition = None;
        }
        Ok(())
    }

    fn is_current(&self, panorama: Entity, generation: u64) -> Result<bool, PanoramaError> {
        Ok(self.panorama(panorama)?.generation == generation)
    }
}
