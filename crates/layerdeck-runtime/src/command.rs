#![forbid(unsafe_code)]

//! Window operations as data.
//!
//! UI components (buttons, menu entries) and event callbacks describe what
//! should happen with a [`Command`] and the host hands it to
//! [`WindowManager::execute`](crate::WindowManager::execute).

use layerdeck_core::{GroupId, WindowId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    Open(WindowId),
    Close(WindowId),
    CloseLast,
    Back,
    LoadGroups(Vec<GroupId>),
    UnloadGroups(Vec<GroupId>),
}
