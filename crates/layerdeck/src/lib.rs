#![forbid(unsafe_code)]

//! layerdeck public facade crate.
//!
//! Re-exports the definition types from `layerdeck-core` and the window
//! manager from `layerdeck-runtime`, with one error type covering both and
//! a prelude for day-to-day usage.
//!
//! ```
//! use layerdeck::prelude::*;
//! use layerdeck::testing::RecordingBackend;
//!
//! fn run() -> layerdeck::Result<()> {
//!     let mut registry = CollectionRegistry::builder();
//!     let main = registry.layer(Layer::new("Main"));
//!     let popup = registry.layer(Layer::new("Popup"));
//!     let home = registry.window(WindowDefinition::new("Home").in_layer(main).prefab("home"));
//!     let confirm = registry.window(WindowDefinition::new("Confirm").in_layer(popup).prefab("confirm"));
//!     let registry = registry.build()?;
//!
//!     let backend = RecordingBackend::new(&registry);
//!     let mut manager = WindowManager::new(registry, backend, ManagerConfig::default());
//!     manager.open(home)?;
//!     manager.open(confirm)?;
//!     manager.back()?;
//!     assert_eq!(manager.focused(), Some(home));
//!     Ok(())
//! }
//! run().unwrap();
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use layerdeck_core::{
    AnimatedTransitions, AssetKey, CollectionRegistry, Direction, EasingKind, Effect, Group,
    GroupId, Layer, LayerBehaviour, LayerId, PrefabKey, RegistryBuilder, RegistryError,
    TransitionEngine, TransitionSpec, WindowDefinition, WindowId, WindowSource, WindowView,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use layerdeck_runtime::{
    AssetBackend, AssetError, Command, Completion, LayerEvent, LoadStatus, ManagerConfig,
    SubscriptionId, WindowError, WindowEvent, WindowManager, WindowObserver, WindowParts,
    WindowState,
};

#[cfg(feature = "test-helpers")]
pub use layerdeck_runtime::testing;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for layerdeck hosts.
#[derive(Debug)]
pub enum Error {
    /// The layer, group and window collections are invalid.
    Registry(RegistryError),
    /// A window manager call failed.
    #[cfg(feature = "runtime")]
    Window(WindowError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Window(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Window(err) => Some(err),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

#[cfg(feature = "runtime")]
impl From<WindowError> for Error {
    fn from(err: WindowError) -> Self {
        Self::Window(err)
    }
}

/// Standard result type for layerdeck APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CollectionRegistry, EasingKind, Error, Group, Layer, LayerBehaviour, Result,
        TransitionSpec, WindowDefinition, WindowView,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        AssetBackend, Command, LayerEvent, ManagerConfig, WindowEvent, WindowManager,
        WindowObserver, WindowParts,
    };

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use layerdeck_core as core;
#[cfg(feature = "runtime")]
pub use layerdeck_runtime as runtime;
