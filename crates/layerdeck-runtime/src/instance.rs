#![forbid(unsafe_code)]

//! Live window instances and their open/close state machine.
//!
//! ```text
//! Uninitialized ──initialize──▶ Closed ⇄ Opening ──▶ Open ⇄ Closing ──▶ Closed
//! ```
//!
//! An instance runs at most one transition at a time. Each transition is
//! identified by a [`Ticket`]; starting a new open or close drops the
//! running transition, and the task that was waiting on it sees its ticket
//! go stale and stops without running the rest of its sequence.

use std::fmt;
use std::time::Duration;

use layerdeck_core::animation::Animation;
use layerdeck_core::{Direction, TransitionEngine, TransitionSpec, WindowId, WindowView};

use crate::backend::WindowParts;
use crate::observer::WindowObserver;

/// Callback invoked when an open or close sequence completes.
pub type Completion = Box<dyn FnOnce(WindowId)>;

/// Lifecycle state of a live window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowState {
    Uninitialized,
    Closed,
    Opening,
    Open,
    Closing,
}

impl WindowState {
    /// Whether the window counts as open: opening or fully open.
    pub fn is_open(self) -> bool {
        matches!(self, WindowState::Opening | WindowState::Open)
    }

    pub fn is_transitioning(self) -> bool {
        matches!(self, WindowState::Opening | WindowState::Closing)
    }
}

/// Identity of one transition run. Issued by the manager, unique for its
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub(crate) u64);

/// What polling a ticket observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPoll {
    Pending,
    /// The transition completed and its tail has run.
    Finished,
    /// Another transition replaced this one.
    Cancelled,
}

struct ActiveTransition {
    ticket: Ticket,
    direction: Direction,
    spec: Option<TransitionSpec>,
    animation: Option<Box<dyn Animation>>,
    /// Interaction state to restore when the transition ends.
    restore_interaction: Option<bool>,
    completion: Option<Completion>,
}

impl ActiveTransition {
    fn is_complete(&self) -> bool {
        self.animation.as_ref().is_none_or(|a| a.is_complete())
    }
}

/// A live window bound to its definition by [`WindowId`].
pub struct WindowInstance {
    window: WindowId,
    state: WindowState,
    view: Box<dyn WindowView>,
    observers: Vec<Box<dyn WindowObserver>>,
    block_interaction: bool,
    active: Option<ActiveTransition>,
}

impl fmt::Debug for WindowInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowInstance")
            .field("window", &self.window)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .field("transitioning", &self.active.is_some())
            .finish()
    }
}

impl WindowInstance {
    pub fn new(window: WindowId, parts: WindowParts, block_interaction: bool) -> Self {
        Self {
            window,
            state: WindowState::Uninitialized,
            view: parts.view,
            observers: parts.observers,
            block_interaction,
            active: None,
        }
    }

    /// Bind the instance and notify observers. Only the first call has an
    /// effect.
    pub fn initialize(&mut self) {
        if self.state != WindowState::Uninitialized {
            return;
        }
        self.state = WindowState::Closed;
        self.view.set_active(false);
        let window = self.window;
        for observer in &mut self.observers {
            observer.on_initialized(window);
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Start the open sequence.
    ///
    /// Returns `None` (and drops `completion`) if the instance is already
    /// open or opening, or was never initialized. A running close is
    /// cancelled.
    pub fn begin_open(
        &mut self,
        ticket: Ticket,
        spec: Option<&TransitionSpec>,
        engine: &mut dyn TransitionEngine,
        completion: Option<Completion>,
    ) -> Option<Ticket> {
        if self.state == WindowState::Uninitialized || self.state.is_open() {
            return None;
        }
        self.cancel_active();
        self.state = WindowState::Opening;
        let restore_interaction = self.block_input();

        let window = self.window;
        for observer in &mut self.observers {
            observer.on_before_open(window);
        }
        self.view.set_active(true);

        let (spec, animation) = self.start_animation(spec, Direction::In, engine);
        self.active = Some(ActiveTransition {
            ticket,
            direction: Direction::In,
            spec,
            animation,
            restore_interaction,
            completion,
        });
        Some(ticket)
    }

    /// Start the close sequence. Mirror of [`begin_open`](Self::begin_open).
    pub fn begin_close(
        &mut self,
        ticket: Ticket,
        spec: Option<&TransitionSpec>,
        engine: &mut dyn TransitionEngine,
        completion: Option<Completion>,
    ) -> Option<Ticket> {
        if !self.state.is_open() {
            return None;
        }
        self.cancel_active();
        self.state = WindowState::Closing;
        let restore_interaction = self.block_input();

        let window = self.window;
        for observer in &mut self.observers {
            observer.on_before_close(window);
        }

        let (spec, animation) = self.start_animation(spec, Direction::Out, engine);
        self.active = Some(ActiveTransition {
            ticket,
            direction: Direction::Out,
            spec,
            animation,
            restore_interaction,
            completion,
        });
        Some(ticket)
    }

    /// Advance the running transition and render its progress.
    pub fn advance(&mut self, dt: Duration, engine: &mut dyn TransitionEngine) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(animation) = active.animation.as_mut() else {
            return;
        };
        if animation.is_complete() {
            return;
        }
        animation.tick(dt);
        if let Some(spec) = &active.spec {
            engine.render(spec, animation.value(), self.view.as_mut());
        }
    }

    /// Check on the transition identified by `ticket`, running the tail of
    /// the sequence if it has completed.
    pub fn poll(&mut self, ticket: Ticket) -> TransitionPoll {
        match &self.active {
            Some(active) if active.ticket == ticket => {
                if !active.is_complete() {
                    return TransitionPoll::Pending;
                }
            }
            _ => return TransitionPoll::Cancelled,
        }
        let Some(active) = self.active.take() else {
            return TransitionPoll::Cancelled;
        };

        let window = self.window;
        match active.direction {
            Direction::In => {
                self.state = WindowState::Open;
                self.restore_input(active.restore_interaction);
                if let Some(completion) = active.completion {
                    completion(window);
                }
                for observer in &mut self.observers {
                    observer.on_after_open(window);
                }
            }
            Direction::Out => {
                self.state = WindowState::Closed;
                self.view.set_active(false);
                self.restore_input(active.restore_interaction);
                if let Some(completion) = active.completion {
                    completion(window);
                }
                for observer in &mut self.observers {
                    observer.on_after_close(window);
                }
            }
        }
        TransitionPoll::Finished
    }

    pub fn notify_gain_focus(&mut self) {
        let window = self.window;
        for observer in &mut self.observers {
            observer.on_gain_focus(window);
        }
    }

    pub fn notify_lost_focus(&mut self) {
        let window = self.window;
        for observer in &mut self.observers {
            observer.on_lost_focus(window);
        }
    }

    /// Drop any running transition and tear the visual object down.
    pub fn destroy(mut self) {
        self.cancel_active();
        self.view.destroy();
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            self.restore_input(active.restore_interaction);
        }
    }

    fn block_input(&mut self) -> Option<bool> {
        if !self.block_interaction {
            return None;
        }
        let previous = self.view.is_interactable();
        self.view.set_interactable(false);
        Some(previous)
    }

    fn restore_input(&mut self, previous: Option<bool>) {
        if let Some(previous) = previous {
            self.view.set_interactable(previous);
        }
    }

    fn start_animation(
        &mut self,
        spec: Option<&TransitionSpec>,
        direction: Direction,
        engine: &mut dyn TransitionEngine,
    ) -> (Option<TransitionSpec>, Option<Box<dyn Animation>>) {
        let Some(spec) = spec else {
            return (None, None);
        };
        engine.before_transition(self.window, spec, direction, self.view.as_mut());
        if spec.total_duration().is_zero() {
            let progress = if spec.is_backwards() { 0.0 } else { 1.0 };
            engine.render(spec, progress, self.view.as_mut());
            return (Some(spec.clone()), None);
        }
        let animation = engine.play(self.window, spec, direction);
        (Some(spec.clone()), Some(animation))
    }
}
