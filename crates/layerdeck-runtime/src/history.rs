#![forbid(unsafe_code)]

//! Back-navigation history.
//!
//! Entries are recorded when a window in a history-eligible layer opens.
//! They are not removed when the window closes some other way, so an entry
//! may be stale; `back` checks whether the window is open before reopening.

use std::collections::VecDeque;

use layerdeck_core::WindowId;

/// Most-recent-last stack of opened windows with an optional length cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<WindowId>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that keeps at most `limit` entries, dropping the oldest.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: Some(limit),
        }
    }

    pub fn push(&mut self, window: WindowId) {
        self.entries.push_back(window);
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
    }

    pub fn pop(&mut self) -> Option<WindowId> {
        self.entries.pop_back()
    }

    pub fn last(&self) -> Option<WindowId> {
        self.entries.back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = WindowId> + '_ {
        self.entries.iter().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerdeck_core::{CollectionRegistry, Layer, WindowDefinition};
    use proptest::prelude::*;

    fn windows(n: usize) -> Vec<WindowId> {
        let mut b = CollectionRegistry::builder();
        b.layer(Layer::new("Main"));
        (0..n)
            .map(|i| b.window(WindowDefinition::new(format!("W{i}"))))
            .collect()
    }

    #[test]
    fn push_pop_is_lifo() {
        let w = windows(2);
        let mut history = History::new();
        history.push(w[0]);
        history.push(w[1]);
        assert_eq!(history.last(), Some(w[1]));
        assert_eq!(history.pop(), Some(w[1]));
        assert_eq!(history.pop(), Some(w[0]));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn limit_drops_oldest() {
        let w = windows(3);
        let mut history = History::with_limit(2);
        for id in &w {
            history.push(*id);
        }
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![w[1], w[2]]);
    }

    proptest! {
        #[test]
        fn never_exceeds_limit(limit in 1usize..8, pushes in prop::collection::vec(0usize..4, 0..32)) {
            let w = windows(4);
            let mut history = History::with_limit(limit);
            for i in &pushes {
                history.push(w[*i]);
                prop_assert!(history.len() <= limit);
            }
            if let Some(last) = pushes.last() {
                prop_assert_eq!(history.last(), Some(w[*last]));
            }
        }
    }
}
