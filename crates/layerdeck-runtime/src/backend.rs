#![forbid(unsafe_code)]

//! The asset side of window instantiation.

use std::fmt;

use layerdeck_core::{AssetKey, LayerId, PrefabKey, WindowId, WindowView};

use crate::observer::WindowObserver;

/// The visual object and observers a backend produces for one window.
pub struct WindowParts {
    pub view: Box<dyn WindowView>,
    pub observers: Vec<Box<dyn WindowObserver>>,
}

impl WindowParts {
    pub fn new(view: impl WindowView + 'static) -> Self {
        Self {
            view: Box::new(view),
            observers: Vec::new(),
        }
    }

    /// Register an observer (builder).
    #[must_use]
    pub fn observer(mut self, observer: impl WindowObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }
}

impl fmt::Debug for WindowParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowParts")
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

/// Result of polling an asynchronous load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    /// The asset is loaded and yields this template.
    Ready(PrefabKey),
    Failed(String),
}

/// Failure reported by an [`AssetBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetError {
    message: String,
}

impl AssetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AssetError {}

/// Instantiates window templates and loads deferred assets.
///
/// Loads are non-blocking: the manager calls [`request_load`] once and then
/// [`poll_load`] at most once per tick until the load resolves.
///
/// [`request_load`]: AssetBackend::request_load
/// [`poll_load`]: AssetBackend::poll_load
pub trait AssetBackend {
    /// Create the visual object for `window` from `prefab`, parented under
    /// the container of `layer`.
    fn instantiate(
        &mut self,
        window: WindowId,
        prefab: &PrefabKey,
        layer: LayerId,
    ) -> Result<WindowParts, AssetError>;

    /// Start loading `key`.
    fn request_load(&mut self, key: &AssetKey);

    fn poll_load(&mut self, key: &AssetKey) -> LoadStatus;

    /// Release a loaded (or loading) asset.
    fn release(&mut self, key: &AssetKey);
}
