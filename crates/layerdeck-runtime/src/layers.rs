#![forbid(unsafe_code)]

//! Per-layer sibling order of live windows.

use layerdeck_core::WindowId;

/// Live windows of one layer, back to front. The last entry is frontmost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerContainer {
    siblings: Vec<WindowId>,
}

impl LayerContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `window` in front of every existing sibling. No-op if present.
    pub fn insert(&mut self, window: WindowId) {
        if !self.siblings.contains(&window) {
            self.siblings.push(window);
        }
    }

    /// Make `window` the frontmost sibling.
    pub fn bring_to_front(&mut self, window: WindowId) {
        self.remove(window);
        self.siblings.push(window);
    }

    pub fn remove(&mut self, window: WindowId) -> bool {
        let before = self.siblings.len();
        self.siblings.retain(|w| *w != window);
        self.siblings.len() != before
    }

    pub fn sibling_index(&self, window: WindowId) -> Option<usize> {
        self.siblings.iter().position(|w| *w == window)
    }

    /// Siblings back to front.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = WindowId> + '_ {
        self.siblings.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }
}
