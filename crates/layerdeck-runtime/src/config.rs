#![forbid(unsafe_code)]

//! Window manager configuration.

use layerdeck_core::WindowId;

/// Startup and navigation settings for a [`WindowManager`](crate::WindowManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Whether [`back`](crate::WindowManager::back) does anything.
    pub back_enabled: bool,
    /// Windows opened by [`start`](crate::WindowManager::start), in order.
    pub initial_windows: Vec<WindowId>,
    /// Whether `start` loads every auto-loaded group first.
    pub load_auto_groups: bool,
    /// Maximum history length. The oldest entries are dropped beyond it.
    pub max_history: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            back_enabled: true,
            initial_windows: Vec::new(),
            load_auto_groups: true,
            max_history: None,
        }
    }
}

impl ManagerConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable back navigation.
    #[must_use]
    pub fn back_enabled(mut self, enabled: bool) -> Self {
        self.back_enabled = enabled;
        self
    }

    /// Open `window` at startup, after the windows added before it.
    #[must_use]
    pub fn initial_window(mut self, window: WindowId) -> Self {
        self.initial_windows.push(window);
        self
    }

    /// Load auto-loaded groups at startup.
    #[must_use]
    pub fn load_auto_groups(mut self, load: bool) -> Self {
        self.load_auto_groups = load;
        self
    }

    /// Cap the history length.
    #[must_use]
    pub fn max_history(mut self, max: usize) -> Self {
        self.max_history = Some(max);
        self
    }
}
