#![forbid(unsafe_code)]

//! Transition specs and the engine that turns them into animations.
//!
//! A [`TransitionSpec`] is plain data attached to a window definition. The
//! runtime hands it to a [`TransitionEngine`], which produces a tickable
//! [`Animation`]; the transition is finished when that animation completes.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use layerdeck_core::{EasingKind, TransitionSpec};
//!
//! let show = TransitionSpec::fade_in(Duration::from_millis(200))
//!     .with_easing(EasingKind::EaseOut);
//! let hide = show.clone().reversed();
//! assert_eq!(hide.start_value(), 1.0);
//! ```

use std::time::Duration;

use crate::animation::{self, Animation, EasingFn, Fade};
use crate::id::WindowId;
use crate::view::WindowView;

/// Which half of the lifecycle a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Played while the window opens.
    In,
    /// Played while the window closes.
    Out,
}

/// Named easing curves. Maps onto the functions in [`animation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EasingKind {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInCubic,
    EaseOutCubic,
}

impl EasingKind {
    pub fn easing_fn(self) -> EasingFn {
        match self {
            Self::Linear => animation::linear,
            Self::EaseIn => animation::ease_in,
            Self::EaseOut => animation::ease_out,
            Self::EaseInOut => animation::ease_in_out,
            Self::EaseInCubic => animation::ease_in_cubic,
            Self::EaseOutCubic => animation::ease_out_cubic,
        }
    }
}

/// The visual property a transition drives, with its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effect {
    /// Opacity, usually between 0.0 and 1.0.
    Fade { from: f32, to: f32 },
    /// Uniform scale factor.
    Scale { from: f32, to: f32 },
}

impl Effect {
    /// Interpolated property value at `progress` (0.0 = `from`, 1.0 = `to`).
    pub fn value_at(&self, progress: f32) -> f32 {
        let (from, to) = match *self {
            Self::Fade { from, to } | Self::Scale { from, to } => (from, to),
        };
        from + (to - from) * progress.clamp(0.0, 1.0)
    }
}

/// Plain description of one window transition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionSpec {
    effect: Effect,
    duration: Duration,
    #[cfg_attr(feature = "serde", serde(default))]
    easing: EasingKind,
    #[cfg_attr(feature = "serde", serde(default))]
    delay: Duration,
    #[cfg_attr(feature = "serde", serde(default))]
    backwards: bool,
}

impl TransitionSpec {
    pub fn new(effect: Effect, duration: Duration) -> Self {
        Self {
            effect,
            duration,
            easing: EasingKind::Linear,
            delay: Duration::ZERO,
            backwards: false,
        }
    }

    /// Opacity 0.0 → 1.0.
    pub fn fade_in(duration: Duration) -> Self {
        Self::new(Effect::Fade { from: 0.0, to: 1.0 }, duration)
    }

    /// Opacity 1.0 → 0.0.
    pub fn fade_out(duration: Duration) -> Self {
        Self::new(Effect::Fade { from: 1.0, to: 0.0 }, duration)
    }

    pub fn scale(from: f32, to: f32, duration: Duration) -> Self {
        Self::new(Effect::Scale { from, to }, duration)
    }

    #[must_use]
    pub fn with_easing(mut self, easing: EasingKind) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Play this transition backwards, from `to` to `from`. Applying it
    /// twice restores the original direction.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.backwards = !self.backwards;
        self
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn easing(&self) -> EasingKind {
        self.easing
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_backwards(&self) -> bool {
        self.backwards
    }

    /// Total time until completion, delay included.
    pub fn total_duration(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }

    /// Property value the view is snapped to before the transition plays.
    pub fn start_value(&self) -> f32 {
        self.effect
            .value_at(if self.backwards { 1.0 } else { 0.0 })
    }

    /// Property value once the transition has completed.
    pub fn end_value(&self) -> f32 {
        self.effect
            .value_at(if self.backwards { 0.0 } else { 1.0 })
    }
}

/// Executes transitions for the window manager.
///
/// The manager only needs "play, then report completion": it ticks the
/// returned animation and treats [`Animation::is_complete`] as the end of
/// the transition. `render` is called after every tick with the animation's
/// current value.
pub trait TransitionEngine {
    /// Prepare `view` before the transition starts playing.
    fn before_transition(
        &mut self,
        window: WindowId,
        spec: &TransitionSpec,
        direction: Direction,
        view: &mut dyn WindowView,
    ) {
        let _ = (window, direction);
        view.apply_effect(spec.effect(), spec.start_value());
    }

    /// Start playing `spec` for `window`.
    fn play(
        &mut self,
        window: WindowId,
        spec: &TransitionSpec,
        direction: Direction,
    ) -> Box<dyn Animation>;

    /// Push the animation's progress to the view.
    fn render(&mut self, spec: &TransitionSpec, progress: f32, view: &mut dyn WindowView) {
        view.apply_effect(spec.effect(), spec.effect().value_at(progress));
    }
}

/// Default engine built on [`Fade`], [`Delayed`](animation::Delayed) and
/// [`Reversed`](animation::Reversed).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimatedTransitions;

impl TransitionEngine for AnimatedTransitions {
    fn play(
        &mut self,
        _window: WindowId,
        spec: &TransitionSpec,
        _direction: Direction,
    ) -> Box<dyn Animation> {
        let fade = Fade::new(spec.duration()).easing(spec.easing().easing_fn());
        let delayed = animation::delay(spec.delay(), fade);
        if spec.is_backwards() {
            Box::new(animation::reversed(delayed))
        } else {
            Box::new(delayed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);

    #[derive(Default)]
    struct Probe {
        applied: Vec<(Effect, f32)>,
    }

    impl WindowView for Probe {
        fn set_active(&mut self, _active: bool) {}
        fn set_interactable(&mut self, _interactable: bool) {}
        fn is_interactable(&self) -> bool {
            true
        }
        fn apply_effect(&mut self, effect: &Effect, value: f32) {
            self.applied.push((*effect, value));
        }
    }

    #[test]
    fn effect_interpolates_endpoints() {
        let fx = Effect::Scale { from: 0.5, to: 1.5 };
        assert!((fx.value_at(0.0) - 0.5).abs() < f32::EPSILON);
        assert!((fx.value_at(0.5) - 1.0).abs() < f32::EPSILON);
        assert!((fx.value_at(2.0) - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn reversed_swaps_start_and_end() {
        let spec = TransitionSpec::fade_in(MS_100);
        assert_eq!(spec.start_value(), 0.0);
        let back = spec.clone().reversed();
        assert_eq!(back.start_value(), 1.0);
        assert_eq!(back.end_value(), 0.0);
        assert_eq!(back.reversed(), spec);
    }

    #[test]
    fn before_transition_snaps_to_start() {
        let mut engine = AnimatedTransitions;
        let mut view = Probe::default();
        let spec = TransitionSpec::fade_out(MS_100);
        engine.before_transition(WindowId::from_index(0), &spec, Direction::Out, &mut view);
        assert_eq!(view.applied, vec![(*spec.effect(), 1.0)]);
    }

    #[test]
    fn play_completes_after_delay_and_duration() {
        let mut engine = AnimatedTransitions;
        let spec = TransitionSpec::fade_in(MS_100).with_delay(MS_100);
        assert_eq!(spec.total_duration(), Duration::from_millis(200));

        let mut anim = engine.play(WindowId::from_index(0), &spec, Direction::In);
        anim.tick(MS_100);
        assert!(!anim.is_complete());
        anim.tick(MS_100);
        assert!(anim.is_complete());
        assert!((anim.value() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn backwards_play_holds_at_one_during_delay() {
        let mut engine = AnimatedTransitions;
        let spec = TransitionSpec::fade_in(MS_100)
            .with_delay(MS_100)
            .reversed();
        let mut anim = engine.play(WindowId::from_index(0), &spec, Direction::Out);
        anim.tick(Duration::from_millis(50));
        assert!((anim.value() - 1.0).abs() < f32::EPSILON);
        anim.tick(Duration::from_millis(150));
        assert!(anim.is_complete());
        assert!(anim.value().abs() < f32::EPSILON);
    }

    #[test]
    fn render_applies_interpolated_value() {
        let mut engine = AnimatedTransitions;
        let mut view = Probe::default();
        let spec = TransitionSpec::scale(0.0, 2.0, MS_100);
        engine.render(&spec, 0.25, &mut view);
        assert_eq!(view.applied, vec![(*spec.effect(), 0.5)]);
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut engine = AnimatedTransitions;
        let spec = TransitionSpec::fade_in(Duration::ZERO);
        let mut anim = engine.play(WindowId::from_index(0), &spec, Direction::In);
        anim.tick(Duration::from_millis(1));
        assert!(anim.is_complete());
    }
}
