#![forbid(unsafe_code)]

//! Lifecycle hooks attached to a live window.

use layerdeck_core::WindowId;

/// Receives lifecycle notifications for one window instance.
///
/// Observers are registered explicitly through
/// [`WindowParts`](crate::WindowParts) when the instance is created. Every
/// hook defaults to doing nothing.
pub trait WindowObserver {
    fn on_initialized(&mut self, _window: WindowId) {}
    fn on_before_open(&mut self, _window: WindowId) {}
    /// Not called when the open is cancelled by a close.
    fn on_after_open(&mut self, _window: WindowId) {}
    fn on_before_close(&mut self, _window: WindowId) {}
    /// Not called when the close is cancelled by an open.
    fn on_after_close(&mut self, _window: WindowId) {}
    fn on_gain_focus(&mut self, _window: WindowId) {}
    fn on_lost_focus(&mut self, _window: WindowId) {}
}
