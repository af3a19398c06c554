#![forbid(unsafe_code)]

//! Animation primitives that window transitions are built from.
//!
//! Time-based animations that produce normalized `f32` values (0.0–1.0).
//! They advance only when ticked, which is what lets the window manager
//! await a transition cooperatively: a transition is finished exactly when
//! its animation reports [`Animation::is_complete`].

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-in (slower start than quadratic).
#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

/// Cubic ease-out (slower end than quadratic).
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);

    /// Time elapsed past completion. [`Delayed`] uses it to forward the
    /// remainder of a tick into its inner animation.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

impl<A: Animation + ?Sized> Animation for Box<A> {
    fn tick(&mut self, dt: Duration) {
        (**self).tick(dt);
    }

    fn is_complete(&self) -> bool {
        (**self).is_complete()
    }

    fn value(&self) -> f32 {
        (**self).value()
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn overshoot(&self) -> Duration {
        (**self).overshoot()
    }
}

// ---------------------------------------------------------------------------
// Fade
// ---------------------------------------------------------------------------

/// Progression from 0.0 to 1.0 over a duration, with configurable easing.
///
/// Elapsed time is tracked as [`Duration`] so accumulation does not drift.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a fade with the given duration and default linear easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
        }
    }

    /// Set the easing function.
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    pub fn raw_progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.raw_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

// ---------------------------------------------------------------------------
// Delayed
// ---------------------------------------------------------------------------

/// Wait for a delay, then play the inner animation.
#[derive(Debug, Clone, Copy)]
pub struct Delayed<A> {
    delay: Duration,
    elapsed: Duration,
    inner: A,
    started: bool,
}

impl<A: Animation> Delayed<A> {
    /// Create a delayed animation that waits `delay` before starting `inner`.
    pub fn new(delay: Duration, inner: A) -> Self {
        Self {
            delay,
            elapsed: Duration::ZERO,
            inner,
            started: delay.is_zero(),
        }
    }

    /// Whether the delay period has elapsed and the inner animation has started.
    pub fn has_started(&self) -> bool {
        self.started
    }
}

impl<A: Animation> Animation for Delayed<A> {
    fn tick(&mut self, dt: Duration) {
        if !self.started {
            self.elapsed = self.elapsed.saturating_add(dt);
            if self.elapsed >= self.delay {
                self.started = true;
                let os = self.elapsed.saturating_sub(self.delay);
                if !os.is_zero() {
                    self.inner.tick(os);
                }
            }
        } else {
            self.inner.tick(dt);
        }
    }

    fn is_complete(&self) -> bool {
        self.started && self.inner.is_complete()
    }

    fn value(&self) -> f32 {
        if self.started {
            self.inner.value()
        } else {
            0.0
        }
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.started = self.delay.is_zero();
        self.inner.reset();
    }

    fn overshoot(&self) -> Duration {
        if self.started {
            self.inner.overshoot()
        } else {
            Duration::ZERO
        }
    }
}

// ---------------------------------------------------------------------------
// Reversed
// ---------------------------------------------------------------------------

/// Play the inner animation backwards: `value()` runs from 1.0 down to 0.0.
///
/// Completion and overshoot are those of the inner animation.
#[derive(Debug, Clone, Copy)]
pub struct Reversed<A> {
    inner: A,
}

impl<A: Animation> Reversed<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<A: Animation> Animation for Reversed<A> {
    fn tick(&mut self, dt: Duration) {
        self.inner.tick(dt);
    }

    fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    fn value(&self) -> f32 {
        1.0 - self.inner.value()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn overshoot(&self) -> Duration {
        self.inner.overshoot()
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Create a [`Delayed`] animation.
pub fn delay<A: Animation>(d: Duration, a: A) -> Delayed<A> {
    Delayed::new(d, a)
}

/// Create a [`Reversed`] animation.
pub fn reversed<A: Animation>(a: A) -> Reversed<A> {
    Reversed::new(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    /// Tick `anim` one frame at a time until it completes, recording the
    /// value after every frame.
    fn run_frames(anim: &mut impl Animation, max_frames: usize) -> Vec<f32> {
        let mut values = Vec::new();
        while !anim.is_complete() && values.len() < max_frames {
            anim.tick(FRAME);
            values.push(anim.value());
        }
        values
    }

    #[test]
    fn easings_share_endpoints() {
        let curves: [EasingFn; 6] = [
            linear,
            ease_in,
            ease_out,
            ease_in_out,
            ease_in_cubic,
            ease_out_cubic,
        ];
        for curve in curves {
            assert!(curve(0.0).abs() < f32::EPSILON);
            assert!((curve(1.0) - 1.0).abs() < f32::EPSILON);
            assert!(curve(-0.3).abs() < f32::EPSILON);
            assert!((curve(1.7) - 1.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn easings_order_at_midpoint() {
        assert!(ease_in_cubic(0.5) < ease_in(0.5));
        assert!(ease_in(0.5) < linear(0.5));
        assert!(linear(0.5) < ease_out(0.5));
        assert!(ease_out(0.5) < ease_out_cubic(0.5));
        assert!((ease_in_out(0.5) - 0.5).abs() < 0.01);
    }

    #[test]
    fn open_fade_rises_frame_by_frame() {
        let mut fade = Fade::new(Duration::from_millis(200)).easing(ease_out);
        let values = run_frames(&mut fade, 100);
        assert_eq!(values.len(), 13);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!((values[values.len() - 1] - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn frames_accumulate_without_drift() {
        let mut fade = Fade::new(Duration::from_secs(1));
        for _ in 0..62 {
            fade.tick(FRAME);
        }
        assert!(!fade.is_complete());
        assert!((fade.raw_progress() - 0.992).abs() < 1e-4);
        fade.tick(FRAME);
        assert!(fade.is_complete());
        assert_eq!(fade.overshoot(), Duration::from_millis(8));
    }

    #[test]
    fn transition_shorter_than_a_frame_finishes_in_one_tick() {
        let mut fade = Fade::new(Duration::from_millis(10));
        fade.tick(FRAME);
        assert!(fade.is_complete());
        assert_eq!(fade.overshoot(), Duration::from_millis(6));
        fade.tick(FRAME);
        assert!((fade.value() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut fade = Fade::new(Duration::ZERO);
        assert!(!fade.is_complete());
        fade.tick(Duration::from_nanos(1));
        assert!(fade.is_complete());
    }

    #[test]
    fn close_fade_holds_during_delay_then_falls() {
        let mut close = reversed(delay(Duration::from_millis(50), Fade::new(Duration::from_millis(100))));
        assert!((close.value() - 1.0).abs() < f32::EPSILON);

        for _ in 0..3 {
            close.tick(FRAME);
        }
        assert!((close.value() - 1.0).abs() < f32::EPSILON);
        assert_eq!(close.overshoot(), Duration::ZERO);

        // 64ms: the delay ended 14ms into this frame.
        close.tick(FRAME);
        assert!((close.value() - 0.86).abs() < 0.01);

        let rest = run_frames(&mut close, 100);
        assert_eq!(rest.len(), 6);
        assert!(rest.windows(2).all(|w| w[0] >= w[1]));
        assert!(close.value().abs() < f32::EPSILON);
    }

    #[test]
    fn delay_overshoot_is_forwarded_to_the_fade() {
        let mut open = delay(Duration::from_millis(100), Fade::new(Duration::from_millis(100)));
        open.tick(Duration::from_millis(112));
        assert!(open.has_started());
        assert!((open.value() - 0.12).abs() < 0.01);
        assert!(!open.is_complete());
    }

    #[test]
    fn zero_delay_starts_immediately() {
        let open = delay(Duration::ZERO, Fade::new(FRAME));
        assert!(open.has_started());
    }

    #[test]
    fn boxed_transition_replays_after_reset() {
        let mut anim: Box<dyn Animation> = Box::new(reversed(delay(
            Duration::from_millis(50),
            Fade::new(Duration::from_millis(150)),
        )));
        run_frames(&mut anim, 100);
        assert!(anim.is_complete());
        assert!(anim.overshoot() > Duration::ZERO);

        anim.reset();
        assert!(!anim.is_complete());
        anim.tick(FRAME);
        assert!((anim.value() - 1.0).abs() < f32::EPSILON);
    }
}
