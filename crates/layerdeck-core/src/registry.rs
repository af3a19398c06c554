#![forbid(unsafe_code)]

//! Collection registry: the ordered layer, group and window definitions a
//! manager works with.
//!
//! The registry is built once at startup and moved into the manager. It is
//! never a process-wide singleton.
//!
//! # Invariants
//!
//! 1. There is at least one layer.
//! 2. Names are unique within each collection.
//! 3. Every window references a layer of this registry; a window registered
//!    without one is placed on the first layer and a warning is logged.
//! 4. Every group a window references belongs to this registry.

use std::collections::HashSet;
use std::fmt;

use crate::group::Group;
use crate::id::{GroupId, LayerId, WindowId};
use crate::layer::Layer;
use crate::window::WindowDefinition;

/// Reasons a registry fails to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No layer was registered.
    NoLayers,
    /// Two items of the same collection share a name.
    DuplicateName { collection: &'static str, name: String },
    /// A window references a layer id this registry never issued.
    UnknownLayer { window: String, layer: LayerId },
    /// A window references a group id this registry never issued.
    UnknownGroup { window: String, group: GroupId },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLayers => write!(f, "registry has no layers"),
            Self::DuplicateName { collection, name } => {
                write!(f, "duplicate {collection} name '{name}'")
            }
            Self::UnknownLayer { window, layer } => {
                write!(f, "window '{window}' references unknown {layer}")
            }
            Self::UnknownGroup { window, group } => {
                write!(f, "window '{window}' references unknown {group}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Ordered layer, group and window definitions with lookup by id and name.
#[derive(Debug, Clone)]
pub struct CollectionRegistry {
    layers: Vec<Layer>,
    groups: Vec<Group>,
    windows: Vec<WindowDefinition>,
}

impl CollectionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Layers in collection order (bottom to top).
    pub fn layers(&self) -> impl DoubleEndedIterator<Item = (LayerId, &Layer)> + '_ {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| (LayerId::from_index(i), layer))
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, group)| (GroupId::from_index(i), group))
    }

    pub fn windows(&self) -> impl Iterator<Item = (WindowId, &WindowDefinition)> + '_ {
        self.windows
            .iter()
            .enumerate()
            .map(|(i, window)| (WindowId::from_index(i), window))
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.index())
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.index())
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.index())
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowDefinition> {
        self.windows.get(id.index())
    }

    pub fn layer_id(&self, name: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .position(|l| l.name() == name)
            .map(LayerId::from_index)
    }

    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.groups
            .iter()
            .position(|g| g.name() == name)
            .map(GroupId::from_index)
    }

    pub fn window_id(&self, name: &str) -> Option<WindowId> {
        self.windows
            .iter()
            .position(|w| w.name() == name)
            .map(WindowId::from_index)
    }

    /// Windows that belong to any of `groups`, in collection order.
    pub fn windows_in_groups(&self, groups: &[GroupId]) -> Vec<WindowId> {
        self.windows()
            .filter(|(_, def)| groups.iter().any(|g| def.is_in_group(*g)))
            .map(|(id, _)| id)
            .collect()
    }

    /// Layer a window belongs to.
    pub fn layer_of(&self, window: WindowId) -> Option<LayerId> {
        self.window(window).map(WindowDefinition::layer)
    }
}

/// Incremental builder for a [`CollectionRegistry`].
///
/// Layers and groups return their ids as they are registered so window
/// definitions can reference them.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    layers: Vec<Layer>,
    groups: Vec<Group>,
    windows: Vec<WindowDefinition>,
}

impl RegistryBuilder {
    /// Register a layer above every previously registered one.
    pub fn layer(&mut self, layer: Layer) -> LayerId {
        self.layers.push(layer);
        LayerId::from_index(self.layers.len() - 1)
    }

    pub fn group(&mut self, group: Group) -> GroupId {
        self.groups.push(group);
        GroupId::from_index(self.groups.len() - 1)
    }

    pub fn window(&mut self, window: WindowDefinition) -> WindowId {
        self.windows.push(window);
        WindowId::from_index(self.windows.len() - 1)
    }

    /// Validate and freeze the collections.
    pub fn build(self) -> Result<CollectionRegistry, RegistryError> {
        let Self {
            layers,
            groups,
            mut windows,
        } = self;

        if layers.is_empty() {
            return Err(RegistryError::NoLayers);
        }
        check_unique("layer", layers.iter().map(Layer::name))?;
        check_unique("group", groups.iter().map(Group::name))?;
        check_unique("window", windows.iter().map(WindowDefinition::name))?;

        for window in &mut windows {
            match window.layer {
                Some(layer) if layer.index() >= layers.len() => {
                    return Err(RegistryError::UnknownLayer {
                        window: window.name().to_string(),
                        layer,
                    });
                }
                Some(_) => {}
                None => {
                    crate::warn!(
                        window = window.name(),
                        layer = layers[0].name(),
                        "window has no layer assigned, using the first one"
                    );
                    window.layer = Some(LayerId::from_index(0));
                }
            }
            if let Some(group) = window.groups().iter().find(|g| g.index() >= groups.len()) {
                return Err(RegistryError::UnknownGroup {
                    window: window.name().to_string(),
                    group: *group,
                });
            }
        }

        crate::debug!(
            layers = layers.len(),
            groups = groups.len(),
            windows = windows.len(),
            "registry built"
        );

        Ok(CollectionRegistry {
            layers,
            groups,
            windows,
        })
    }
}

fn check_unique<'a>(
    collection: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(RegistryError::DuplicateName {
                collection,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
