#![forbid(unsafe_code)]

//! Core: layer, group and window definitions, the collection registry, and
//! the animation primitives that window transitions are built from.

pub mod animation;
pub mod group;
pub mod id;
pub mod layer;
pub mod logging;
pub mod registry;
pub mod transition;
pub mod view;
pub mod window;

pub use group::Group;
pub use id::{GroupId, LayerId, WindowId};
pub use layer::{Layer, LayerBehaviour};
pub use registry::{CollectionRegistry, RegistryBuilder, RegistryError};
pub use transition::{
    AnimatedTransitions, Direction, EasingKind, Effect, TransitionEngine, TransitionSpec,
};
pub use view::WindowView;
pub use window::{AssetKey, PrefabKey, WindowDefinition, WindowSource};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, warn};
