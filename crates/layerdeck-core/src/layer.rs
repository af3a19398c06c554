#![forbid(unsafe_code)]

//! Layers: ordered visual buckets with a stacking policy.

/// How a layer treats several open windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerBehaviour {
    /// At most one open window; opening another closes its siblings.
    #[default]
    Exclusive,
    /// Any number of windows may be open at once.
    Additive,
}

/// An ordered visual bucket (e.g. "Main", "Popup").
///
/// The ordering index is the layer's position in the registry: layers
/// registered later draw above layers registered earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    name: String,
    behaviour: LayerBehaviour,
    included_in_history: bool,
}

impl Layer {
    /// Create an exclusive, history-eligible layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: LayerBehaviour::Exclusive,
            included_in_history: true,
        }
    }

    /// Set the stacking policy (builder).
    #[must_use]
    pub fn behaviour(mut self, behaviour: LayerBehaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    /// Shorthand for `behaviour(LayerBehaviour::Additive)`.
    #[must_use]
    pub fn additive(self) -> Self {
        self.behaviour(LayerBehaviour::Additive)
    }

    /// Whether opens in this layer are recorded for back navigation (builder).
    #[must_use]
    pub fn in_history(mut self, included: bool) -> Self {
        self.included_in_history = included;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stacking(&self) -> LayerBehaviour {
        self.behaviour
    }

    pub fn is_exclusive(&self) -> bool {
        self.behaviour == LayerBehaviour::Exclusive
    }

    pub fn included_in_history(&self) -> bool {
        self.included_in_history
    }

    /// Toggle history inclusion at runtime.
    pub fn set_included_in_history(&mut self, included: bool) {
        self.included_in_history = included;
    }
}
