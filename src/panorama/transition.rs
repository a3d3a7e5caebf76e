//! Easing functions and the tween scheduler that drives panorama transitions.
//!
//! The [`Animator`] is a plain value owned by the [`PanoramaWorld`](crate::PanoramaWorld)
//! (or injected with [`PanoramaWorld::with_animator`](crate::PanoramaWorld::with_animator)).
//! It never calls back into the world: [`Animator::update`] returns the
//! lifecycle notifications that fired during the step, in scheduling order,
//! and the world applies them. Owners keep the [`TweenId`]s they scheduled so
//! they can cancel their own tasks.

use hecs::Entity;

/// Easing functions for smooth transitions.
///
/// These control the acceleration curve of transition animations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed throughout.
    #[default]
    Linear,
    /// Start slow, accelerate.
    EaseIn,
    /// Start fast, decelerate.
    EaseOut,
    /// Start slow, speed up, then slow down.
    EaseInOut,
    /// Strong deceleration: `1 - (1 - t)^4`. Used for panorama fades.
    QuarticOut,
}

impl Easing {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::QuarticOut => 1.0 - (1.0 - t).powi(4),
        }
    }
}

/// Handle to a scheduled tween.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TweenId(u64);

/// What a tween animates, and therefore how its notifications are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenKind {
    /// The owner panorama's material opacity.
    Fade,
    /// Empty hold tween of an enter transition. Only start matters.
    Enter { generation: u64 },
    /// Empty hold tween of a leave transition. Start and completion matter.
    Leave { generation: u64 },
    /// The owner marker's opacity while showing or hiding.
    MarkerFade { showing: bool },
}

/// Parameters for [`Animator::schedule`].
#[derive(Clone, Copy, Debug)]
pub struct TweenSpec {
    /// Entity the tween belongs to.
    pub owner: Entity,
    pub kind: TweenKind,
    pub from: f32,
    pub to: f32,
    /// Duration in seconds, measured after the delay.
    pub duration: f32,
    /// Seconds to wait before starting.
    pub delay: f32,
    pub easing: Easing,
}

impl TweenSpec {
    /// A tween from `from` to `to` with no delay and linear easing.
    pub fn new(owner: Entity, kind: TweenKind, from: f32, to: f32, duration: f32) -> Self {
        Self {
            owner,
            kind,
            from,
            to,
            duration,
            delay: 0.0,
            easing: Easing::Linear,
        }
    }

    /// A tween that animates nothing and only reports start and completion.
    pub fn hold(owner: Entity, kind: TweenKind, duration: f32) -> Self {
        Self::new(owner, kind, 0.0, 0.0, duration)
    }

    /// Set the start delay in seconds.
    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Set the easing function.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Lifecycle notification produced by [`Animator::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenEvent {
    /// The delay elapsed and the tween began.
    Started {
        id: TweenId,
        owner: Entity,
        kind: TweenKind,
    },
    /// New eased value for a running tween.
    Updated {
        id: TweenId,
        owner: Entity,
        kind: TweenKind,
        value: f32,
    },
    /// The tween reached its end value and was removed.
    Completed {
        id: TweenId,
        owner: Entity,
        kind: TweenKind,
    },
}

#[derive(Debug)]
struct ActiveTween {
    id: TweenId,
    spec: TweenSpec,
    /// Seconds since scheduling, delay included.
    elapsed: f32,
    started: bool,
}

/// Time-driven tween scheduler.
#[derive(Debug, Default)]
pub struct Animator {
    tweens: Vec<ActiveTween>,
    next_id: u64,
}

impl Animator {
    /// Create an empty animator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a tween. It starts counting on the next [`update`](Self::update).
    pub fn schedule(&mut self, spec: TweenSpec) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.push(ActiveTween {
            id,
            spec: TweenSpec {
                duration: spec.duration.max(0.0),
                delay: spec.delay.max(0.0),
                ..spec
            },
            elapsed: 0.0,
            started: false,
        });
        id
    }

    /// Cancel a tween. No further notifications fire for it.
    ///
    /// Returns `false` if it had already completed or been cancelled.
    pub fn cancel(&mut self, id: TweenId) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.id != id);
        self.tweens.len() != before
    }

    /// Whether the tween is still scheduled or running.
    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.iter().any(|t| t.id == id)
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Advance every tween by `dt` seconds and collect what happened.
    ///
    /// A tween whose delay ends inside this step reports `Started`, then an
    /// `Updated` for the remainder of the step, then `Completed` if it also
    /// finished. Zero-duration tweens finish on the step they start.
    pub fn update(&mut self, dt: f32) -> Vec<TweenEvent> {
        let dt = dt.max(0.0);
        let mut events = Vec::new();

        self.tweens.retain_mut(|tween| {
            tween.elapsed += dt;
            let spec = &tween.spec;
            let (id, owner, kind) = (tween.id, spec.owner, spec.kind);

            if tween.elapsed < spec.delay {
                return true;
            }

            if !tween.started {
                tween.started = true;
                events.push(TweenEvent::Started { id, owner, kind });
            }

            let raw = if spec.duration > 0.0 {
                ((tween.elapsed - spec.delay) / spec.duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let value = spec.from + (spec.to - spec.from) * spec.easing.apply(raw);
            events.push(TweenEvent::Updated {
                id,
                owner,
                kind,
                value,
            });

            if raw >= 1.0 {
                events.push(TweenEvent::Completed { id, owner, kind });
                return false;
            }
            true
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Entity {
        hecs::World::new().spawn(())
    }

    #[test]
    fn quartic_out_endpoints_and_shape() {
        let e = Easing::QuarticOut;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert!((e.apply(0.5) - 0.9375).abs() < 1e-6);
    }

    #[test]
    fn easing_clamps_input() {
        assert_eq!(Easing::Linear.apply(-0.5), 0.0);
        assert_eq!(Easing::EaseInOut.apply(1.5), 1.0);
    }

    #[test]
    fn delayed_tween_starts_after_delay() {
        let mut animator = Animator::new();
        let spec = TweenSpec::hold(owner(), TweenKind::Enter { generation: 1 }, 0.5).delay(0.5);
        let id = animator.schedule(spec);

        assert!(animator.update(0.25).is_empty());
        let events = animator.update(0.3);
        assert!(matches!(events[0], TweenEvent::Started { id: started, .. } if started == id));
        assert!(animator.is_active(id));

        let events = animator.update(0.5);
        assert!(matches!(events.last(), Some(TweenEvent::Completed { .. })));
        assert!(!animator.is_active(id));
    }

    #[test]
    fn values_follow_easing() {
        let mut animator = Animator::new();
        animator.schedule(
            TweenSpec::new(owner(), TweenKind::Fade, 0.0, 1.0, 1.0).easing(Easing::QuarticOut),
        );

        let events = animator.update(0.5);
        let value = events
            .iter()
            .find_map(|e| match e {
                TweenEvent::Updated { value, .. } => Some(*value),
                _ => None,
            })
            .unwrap();
        assert!((value - 0.9375).abs() < 1e-5);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut animator = Animator::new();
        animator.schedule(TweenSpec::new(owner(), TweenKind::Fade, 1.0, 0.0, 0.0));

        let events = animator.update(0.0);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], TweenEvent::Updated { value, .. } if value == 0.0));
        assert!(animator.is_empty());
    }

    #[test]
    fn cancelled_tween_is_silent() {
        let mut animator = Animator::new();
        let id = animator.schedule(TweenSpec::new(owner(), TweenKind::Fade, 0.0, 1.0, 1.0));
        assert!(animator.cancel(id));
        assert!(!animator.cancel(id));
        assert!(animator.update(2.0).is_empty());
    }

    #[test]
    fn events_keep_scheduling_order() {
        let mut animator = Animator::new();
        let first = animator.schedule(TweenSpec::new(owner(), TweenKind::Fade, 0.0, 1.0, 0.1));
        let second = animator.schedule(TweenSpec::new(owner(), TweenKind::Fade, 0.0, 1.0, 0.1));

        let starts: Vec<TweenId> = animator
            .update(0.05)
            .into_iter()
            .filter_map(|e| match e {
                TweenEvent::Started { id, .. } => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![first, second]);
    }
}
