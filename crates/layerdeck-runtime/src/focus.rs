#![forbid(unsafe_code)]

//! Focus resolution.
//!
//! Focus belongs to the frontmost focusable open window of the topmost
//! layer that has one. Registering any manual focus key hands focus to
//! something outside the manager and clears window focus.

use std::collections::BTreeSet;

use layerdeck_core::WindowId;

use crate::layers::LayerContainer;

/// Keys of external objects that currently own focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualFocus {
    keys: BTreeSet<String>,
}

impl ManualFocus {
    /// Returns `false` if the key was already registered.
    pub fn add(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.keys.remove(key)
    }

    pub fn is_active(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// Pick the window that should hold focus.
///
/// `containers` are indexed by layer, bottom to top. A layer whose open
/// windows are all unfocusable is skipped.
pub fn resolve(
    containers: &[LayerContainer],
    manual: &ManualFocus,
    is_open: impl Fn(WindowId) -> bool,
    is_focusable: impl Fn(WindowId) -> bool,
) -> Option<WindowId> {
    if manual.is_active() {
        return None;
    }
    containers.iter().rev().find_map(|container| {
        container
            .iter()
            .rev()
            .filter(|w| is_open(*w))
            .find(|w| is_focusable(*w))
    })
}
