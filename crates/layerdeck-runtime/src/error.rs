#![forbid(unsafe_code)]

//! Errors returned by window manager calls.
//!
//! Configuration problems that have a safe fallback are logged and never
//! reach the caller. What remains here is misuse the caller has to handle:
//! unknown ids, windows that cannot be instantiated, and windows whose
//! asset failed to load.

use std::fmt;

use layerdeck_core::{GroupId, LayerId, WindowId};

use crate::backend::AssetError;

/// Error type for [`WindowManager`](crate::WindowManager) operations.
#[derive(Debug)]
pub enum WindowError {
    /// The window id was not issued by the manager's registry.
    UnknownWindow(WindowId),
    /// The group id was not issued by the manager's registry.
    UnknownGroup(GroupId),
    /// The layer id was not issued by the manager's registry.
    UnknownLayer(LayerId),
    /// The window has no template to instantiate.
    MissingPrefab { window: String },
    /// The window's asynchronous load failed. Request the load again
    /// (for example with a group load) before opening it.
    LoadFailed { window: String, reason: String },
    /// The asset backend could not instantiate the window.
    Instantiate { window: String, source: AssetError },
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::UnknownWindow(id) => write!(f, "unknown window: {id}"),
            WindowError::UnknownGroup(id) => write!(f, "unknown group: {id}"),
            WindowError::UnknownLayer(id) => write!(f, "unknown layer: {id}"),
            WindowError::MissingPrefab { window } => {
                write!(f, "window '{window}' has no prefab to instantiate")
            }
            WindowError::LoadFailed { window, reason } => {
                write!(f, "window '{window}' failed to load: {reason}")
            }
            WindowError::Instantiate { window, source } => {
                write!(f, "failed to instantiate window '{window}': {source}")
            }
        }
    }
}

impl std::error::Error for WindowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WindowError::Instantiate { source, .. } => Some(source),
            _ => None,
        }
    }
}
