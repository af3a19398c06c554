#![forbid(unsafe_code)]

//! Runtime: the window manager and everything it coordinates.
//!
//! # Scheduling
//!
//! The manager is single-threaded and cooperative. Every open, close and
//! load is a task that the manager polls after each public call and after
//! each [`WindowManager::tick`]. A task only suspends while a transition is
//! playing or while an asynchronous asset load is pending, so a window
//! without a transition opens and closes within the call that requested it.
//!
//! Event callbacks receive no access to the manager. Hosts that want to
//! react to an event with another window operation queue a [`Command`] and
//! pass it to [`WindowManager::execute`] afterwards.

pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod focus;
pub mod history;
pub mod instance;
pub mod layers;
pub mod loader;
pub mod manager;
pub mod observer;
mod task;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use backend::{AssetBackend, AssetError, LoadStatus, WindowParts};
pub use command::Command;
pub use config::ManagerConfig;
pub use error::WindowError;
pub use events::{EventBus, LayerEvent, SubscriptionId, WindowEvent};
pub use history::History;
pub use instance::{Completion, WindowInstance, WindowState};
pub use layers::LayerContainer;
pub use loader::{LoadProgress, PrefabLoader};
pub use manager::WindowManager;
pub use observer::WindowObserver;
