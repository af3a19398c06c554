#![forbid(unsafe_code)]

//! Suspended manager sequences.
//!
//! Each variant is the remainder of a manager operation after its first
//! suspension point. The manager polls them until they report
//! [`Step::Done`].

use layerdeck_core::WindowId;

use crate::instance::{Completion, Ticket};

pub(crate) enum Task {
    /// Waiting for an open transition, then focus and `Opened`.
    Open {
        window: WindowId,
        ticket: Ticket,
        previously_open: Vec<WindowId>,
    },
    /// Waiting for a close transition, then layer, focus and `Closed`.
    Close { window: WindowId, ticket: Ticket },
    /// Waiting for asynchronous loads.
    Load(LoadTask),
}

pub(crate) struct LoadTask {
    /// Every window the load covers.
    pub(crate) windows: Vec<WindowId>,
    /// Asynchronous windows whose load has not settled.
    pub(crate) waiting: Vec<WindowId>,
    /// Frame of the last backend poll. Loads are polled once per frame.
    pub(crate) last_poll: Option<u64>,
    pub(crate) then: Option<AfterLoad>,
}

pub(crate) enum AfterLoad {
    /// Instantiate the loaded windows, then run the group callback.
    Instantiate(Option<Box<dyn FnOnce()>>),
    /// Open the single window the task waited for.
    Open(Option<Completion>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Pending,
    Done,
}
