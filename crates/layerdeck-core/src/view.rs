#![forbid(unsafe_code)]

//! The visual object behind a live window.

use crate::transition::Effect;

/// Engine-side handle to a window's visual object.
///
/// The manager never renders anything itself. It toggles visibility and
/// interactivity through this trait and forwards transition progress.
pub trait WindowView {
    /// Show or hide the visual object.
    fn set_active(&mut self, active: bool);

    /// Enable or disable input on the visual object.
    fn set_interactable(&mut self, interactable: bool);

    fn is_interactable(&self) -> bool;

    /// Apply one frame of a transition effect.
    fn apply_effect(&mut self, effect: &Effect, value: f32) {
        let _ = (effect, value);
    }

    /// Tear the visual object down. Called once when the instance is dropped
    /// by an unload.
    fn destroy(&mut self) {}
}
