#![forbid(unsafe_code)]

//! Event bus for window and layer notifications.
//!
//! Four subscription shapes:
//!
//! - per window and event kind,
//! - any window for one event kind (the callback receives the window),
//! - transition pairs: "`from` was open right before `to` finished opening",
//! - per layer and layer event kind, plus layer focus changes.
//!
//! Per-window subscribers always run before any-window subscribers.
//! Subscribers of the same shape run in subscription order.

use std::fmt;

use layerdeck_core::{LayerId, WindowId};

/// Window lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
    WindowInitialized,
    BeforeOpen,
    Opened,
    BeforeClose,
    Closed,
    LostFocus,
    GainedFocus,
    BeforeLoad,
    Loaded,
    BeforeDestroy,
    Destroyed,
}

impl WindowEvent {
    pub const ALL: [WindowEvent; 11] = [
        WindowEvent::WindowInitialized,
        WindowEvent::BeforeOpen,
        WindowEvent::Opened,
        WindowEvent::BeforeClose,
        WindowEvent::Closed,
        WindowEvent::LostFocus,
        WindowEvent::GainedFocus,
        WindowEvent::BeforeLoad,
        WindowEvent::Loaded,
        WindowEvent::BeforeDestroy,
        WindowEvent::Destroyed,
    ];
}

/// Layer-level events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerEvent {
    GainedFocus,
    LostFocus,
    /// The layer went from no open window to at least one.
    Activated,
    /// The last open window of the layer finished closing.
    Deactivated,
}

/// Handle returned by every subscribe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut()>;
type WindowCallback = Box<dyn FnMut(WindowId)>;
type LayerFocusCallback = Box<dyn FnMut(Option<LayerId>, Option<LayerId>)>;

struct Entry<K, F> {
    id: SubscriptionId,
    key: K,
    callback: F,
}

/// Subscriber registry and dispatcher.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    window: Vec<Entry<(WindowEvent, WindowId), Callback>>,
    any: Vec<Entry<WindowEvent, WindowCallback>>,
    pairs: Vec<Entry<(WindowId, WindowId), Callback>>,
    layer: Vec<Entry<(LayerEvent, LayerId), Callback>>,
    layer_focus: Vec<Entry<(), LayerFocusCallback>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("window", &self.window.len())
            .field("any", &self.any.len())
            .field("pairs", &self.pairs.len())
            .field("layer", &self.layer.len())
            .field("layer_focus", &self.layer_focus.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    pub fn subscribe_window(
        &mut self,
        event: WindowEvent,
        window: WindowId,
        callback: impl FnMut() + 'static,
    ) -> SubscriptionId {
        let id = self.next();
        self.window.push(Entry {
            id,
            key: (event, window),
            callback: Box::new(callback),
        });
        id
    }

    pub fn subscribe_any(
        &mut self,
        event: WindowEvent,
        callback: impl FnMut(WindowId) + 'static,
    ) -> SubscriptionId {
        let id = self.next();
        self.any.push(Entry {
            id,
            key: event,
            callback: Box::new(callback),
        });
        id
    }

    /// Call `callback` whenever `to` finishes opening while `from` was open
    /// right before the open started.
    pub fn subscribe_transition(
        &mut self,
        from: WindowId,
        to: WindowId,
        callback: impl FnMut() + 'static,
    ) -> SubscriptionId {
        let id = self.next();
        self.pairs.push(Entry {
            id,
            key: (from, to),
            callback: Box::new(callback),
        });
        id
    }

    pub fn subscribe_layer(
        &mut self,
        event: LayerEvent,
        layer: LayerId,
        callback: impl FnMut() + 'static,
    ) -> SubscriptionId {
        let id = self.next();
        self.layer.push(Entry {
            id,
            key: (event, layer),
            callback: Box::new(callback),
        });
        id
    }

    /// Call `callback(old, new)` whenever focus moves to another layer.
    pub fn subscribe_layer_focus_changed(
        &mut self,
        callback: impl FnMut(Option<LayerId>, Option<LayerId>) + 'static,
    ) -> SubscriptionId {
        let id = self.next();
        self.layer_focus.push(Entry {
            id,
            key: (),
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        fn drop_from<K, F>(list: &mut Vec<Entry<K, F>>, id: SubscriptionId) -> bool {
            let before = list.len();
            list.retain(|e| e.id != id);
            list.len() != before
        }
        drop_from(&mut self.window, id)
            || drop_from(&mut self.any, id)
            || drop_from(&mut self.pairs, id)
            || drop_from(&mut self.layer, id)
            || drop_from(&mut self.layer_focus, id)
    }

    pub fn len(&self) -> usize {
        self.window.len()
            + self.any.len()
            + self.pairs.len()
            + self.layer.len()
            + self.layer_focus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn emit_window(&mut self, event: WindowEvent, window: WindowId) {
        for entry in &mut self.window {
            if entry.key == (event, window) {
                (entry.callback)();
            }
        }
        for entry in &mut self.any {
            if entry.key == event {
                (entry.callback)(window);
            }
        }
    }

    /// Fire pair subscriptions for every `from` in `previously_open`.
    pub(crate) fn emit_transitions(&mut self, previously_open: &[WindowId], to: WindowId) {
        for from in previously_open {
            for entry in &mut self.pairs {
                if entry.key == (*from, to) {
                    (entry.callback)();
                }
            }
        }
    }

    pub(crate) fn emit_layer(&mut self, event: LayerEvent, layer: LayerId) {
        for entry in &mut self.layer {
            if entry.key == (event, layer) {
                (entry.callback)();
            }
        }
    }

    pub(crate) fn emit_layer_focus_changed(&mut self, old: Option<LayerId>, new: Option<LayerId>) {
        for entry in &mut self.layer_focus {
            (entry.callback)(old, new);
        }
    }
}
