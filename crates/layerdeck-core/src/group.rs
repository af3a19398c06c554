#![forbid(unsafe_code)]

//! Groups: tags for loading and unloading windows together.

/// A named set of windows that are instantiated and destroyed together.
///
/// Groups cut across layers and never influence exclusivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    auto_loaded: bool,
}

impl Group {
    /// Create a group that is loaded when the manager starts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_loaded: true,
        }
    }

    /// Whether the manager loads this group at startup (builder).
    #[must_use]
    pub fn auto_loaded(mut self, auto_loaded: bool) -> Self {
        self.auto_loaded = auto_loaded;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_auto_loaded(&self) -> bool {
        self.auto_loaded
    }
}
