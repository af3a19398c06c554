#![forbid(unsafe_code)]

//! Window definitions: static identity and configuration for one window.
//!
//! A definition lives for the whole application. Only the live instance it
//! produces is created and destroyed at runtime.

use std::collections::BTreeSet;
use std::fmt;

use crate::id::{GroupId, LayerId};
use crate::transition::TransitionSpec;

/// Key of a template the asset backend can instantiate synchronously.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrefabKey(String);

impl PrefabKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrefabKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of an asset that has to be loaded before it yields a [`PrefabKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey(String);

impl AssetKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a window's visual template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowSource {
    /// A template available immediately. `None` means no template was
    /// assigned; such a window can only be adopted, never instantiated.
    Prefab(Option<PrefabKey>),
    /// A template behind an asynchronous load.
    Deferred(AssetKey),
}

impl WindowSource {
    /// Whether the template needs an asynchronous load first.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

/// Static identity and configuration for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDefinition {
    name: String,
    pub(crate) layer: Option<LayerId>,
    groups: BTreeSet<GroupId>,
    source: WindowSource,
    transition_in: Option<TransitionSpec>,
    transition_out: Option<TransitionSpec>,
    focusable: bool,
    block_interaction: bool,
}

impl WindowDefinition {
    /// Create a definition with no layer, no groups and no template.
    ///
    /// A definition registered without a layer is placed on the first layer
    /// of the registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: None,
            groups: BTreeSet::new(),
            source: WindowSource::Prefab(None),
            transition_in: None,
            transition_out: None,
            focusable: true,
            block_interaction: true,
        }
    }

    /// Place the window on `layer` (builder).
    #[must_use]
    pub fn in_layer(mut self, layer: LayerId) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Add the window to `group` (builder). May be called repeatedly.
    #[must_use]
    pub fn in_group(mut self, group: GroupId) -> Self {
        self.groups.insert(group);
        self
    }

    /// Use a synchronously available template (builder).
    #[must_use]
    pub fn prefab(mut self, key: impl Into<String>) -> Self {
        self.source = WindowSource::Prefab(Some(PrefabKey::new(key)));
        self
    }

    /// Use a template behind an asynchronous load (builder).
    #[must_use]
    pub fn deferred(mut self, key: impl Into<String>) -> Self {
        self.source = WindowSource::Deferred(AssetKey::new(key));
        self
    }

    /// Transition played while opening (builder).
    #[must_use]
    pub fn transition_in(mut self, spec: TransitionSpec) -> Self {
        self.transition_in = Some(spec);
        self
    }

    /// Transition played while closing (builder).
    #[must_use]
    pub fn transition_out(mut self, spec: TransitionSpec) -> Self {
        self.transition_out = Some(spec);
        self
    }

    /// Whether the window may receive focus (builder). Default: true.
    #[must_use]
    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    /// Whether interaction is disabled while a transition plays (builder).
    /// Default: true.
    #[must_use]
    pub fn block_interaction_during_transition(mut self, block: bool) -> Self {
        self.block_interaction = block;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning layer. Always set once the definition is in a registry.
    pub fn layer(&self) -> LayerId {
        self.layer.unwrap_or(LayerId(0))
    }

    pub fn groups(&self) -> &BTreeSet<GroupId> {
        &self.groups
    }

    pub fn is_in_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }

    pub fn source(&self) -> &WindowSource {
        &self.source
    }

    pub fn transition_for_open(&self) -> Option<&TransitionSpec> {
        self.transition_in.as_ref()
    }

    pub fn transition_for_close(&self) -> Option<&TransitionSpec> {
        self.transition_out.as_ref()
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn blocks_interaction(&self) -> bool {
        self.block_interaction
    }
}
