#![forbid(unsafe_code)]

//! Recording fakes for tests and headless demos.
//!
//! [`RecordingBackend`] instantiates every window with a [`RecordingView`]
//! and a [`RecordingObserver`], scripts deferred loads, and keeps probes so
//! tests can inspect the visual objects the manager drives.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use layerdeck_core::{
    AssetKey, CollectionRegistry, Effect, LayerId, PrefabKey, TransitionEngine, WindowId,
    WindowView,
};

use crate::backend::{AssetBackend, AssetError, LoadStatus, WindowParts};
use crate::events::{LayerEvent, WindowEvent};
use crate::manager::WindowManager;
use crate::observer::WindowObserver;

/// Shared, ordered list of log lines.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Return and clear the entries.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.borrow().iter().any(|e| e == entry)
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.borrow().iter().position(|e| e == entry)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Snapshot of what the manager did to a [`RecordingView`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub active: bool,
    pub interactable: bool,
    pub effects: Vec<(Effect, f32)>,
    pub destroyed: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            active: false,
            interactable: true,
            effects: Vec::new(),
            destroyed: false,
        }
    }
}

/// Read handle onto a [`RecordingView`].
#[derive(Debug, Clone, Default)]
pub struct ViewProbe(Rc<RefCell<ViewState>>);

impl ViewProbe {
    pub fn state(&self) -> ViewState {
        self.0.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.0.borrow().active
    }

    pub fn is_interactable(&self) -> bool {
        self.0.borrow().interactable
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.borrow().destroyed
    }

    pub fn last_effect(&self) -> Option<(Effect, f32)> {
        self.0.borrow().effects.last().copied()
    }
}

/// [`WindowView`] that records every call into a [`ViewProbe`].
#[derive(Debug, Default)]
pub struct RecordingView {
    probe: ViewProbe,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> ViewProbe {
        self.probe.clone()
    }
}

impl WindowView for RecordingView {
    fn set_active(&mut self, active: bool) {
        self.probe.0.borrow_mut().active = active;
    }

    fn set_interactable(&mut self, interactable: bool) {
        self.probe.0.borrow_mut().interactable = interactable;
    }

    fn is_interactable(&self) -> bool {
        self.probe.is_interactable()
    }

    fn apply_effect(&mut self, effect: &Effect, value: f32) {
        self.probe.0.borrow_mut().effects.push((*effect, value));
    }

    fn destroy(&mut self) {
        self.probe.0.borrow_mut().destroyed = true;
    }
}

/// Observer that logs `"<name>:<hook>"` lines.
#[derive(Debug, Clone)]
pub struct RecordingObserver {
    name: String,
    log: EventLog,
}

impl RecordingObserver {
    pub fn new(name: impl Into<String>, log: EventLog) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }

    fn record(&self, hook: &str) {
        self.log.push(format!("{}:{hook}", self.name));
    }
}

impl WindowObserver for RecordingObserver {
    fn on_initialized(&mut self, _window: WindowId) {
        self.record("initialized");
    }
    fn on_before_open(&mut self, _window: WindowId) {
        self.record("before_open");
    }
    fn on_after_open(&mut self, _window: WindowId) {
        self.record("after_open");
    }
    fn on_before_close(&mut self, _window: WindowId) {
        self.record("before_close");
    }
    fn on_after_close(&mut self, _window: WindowId) {
        self.record("after_close");
    }
    fn on_gain_focus(&mut self, _window: WindowId) {
        self.record("gain_focus");
    }
    fn on_lost_focus(&mut self, _window: WindowId) {
        self.record("lost_focus");
    }
}

/// How a scripted deferred load resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadScript {
    /// Pending for this many polls, then ready.
    ReadyAfter(u32),
    /// Pending for this many polls, then failed with the reason.
    FailAfter(u32, String),
    /// Never resolves.
    Never,
}

/// In-memory [`AssetBackend`].
///
/// Unscripted loads resolve on the first poll with a template named after
/// the asset key.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    names: HashMap<WindowId, String>,
    log: EventLog,
    probes: HashMap<WindowId, ViewProbe>,
    scripts: HashMap<AssetKey, LoadScript>,
    polls: HashMap<AssetKey, u32>,
    broken: HashSet<PrefabKey>,
    requested: Vec<AssetKey>,
    released: Vec<AssetKey>,
    instantiated: Vec<WindowId>,
}

impl RecordingBackend {
    /// Backend that names observers after the windows of `registry`.
    pub fn new(registry: &CollectionRegistry) -> Self {
        Self {
            names: registry
                .windows()
                .map(|(id, def)| (id, def.name().to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Log shared by every observer this backend creates.
    pub fn observer_log(&self) -> EventLog {
        self.log.clone()
    }

    pub fn script(&mut self, key: &str, script: LoadScript) {
        self.scripts.insert(AssetKey::new(key), script);
    }

    /// Make instantiation of `prefab` fail.
    pub fn break_prefab(&mut self, prefab: &str) {
        self.broken.insert(PrefabKey::new(prefab));
    }

    /// Probe of the most recent view created for `window`.
    pub fn probe(&self, window: WindowId) -> Option<ViewProbe> {
        self.probes.get(&window).cloned()
    }

    pub fn requested(&self) -> &[AssetKey] {
        &self.requested
    }

    pub fn released(&self) -> &[AssetKey] {
        &self.released
    }

    pub fn instantiated(&self) -> &[WindowId] {
        &self.instantiated
    }

    /// Polls of `key` since its load was last requested.
    pub fn polls(&self, key: &str) -> u32 {
        self.polls.get(&AssetKey::new(key)).copied().unwrap_or(0)
    }

    /// Build recording parts for `window` without instantiating, for
    /// [`WindowManager::adopt`].
    pub fn make_parts(&mut self, window: WindowId) -> WindowParts {
        let view = RecordingView::new();
        self.probes.insert(window, view.probe());
        let name = self
            .names
            .get(&window)
            .cloned()
            .unwrap_or_else(|| window.to_string());
        WindowParts::new(view).observer(RecordingObserver::new(name, self.log.clone()))
    }
}

impl AssetBackend for RecordingBackend {
    fn instantiate(
        &mut self,
        window: WindowId,
        prefab: &PrefabKey,
        _layer: LayerId,
    ) -> Result<WindowParts, AssetError> {
        if self.broken.contains(prefab) {
            return Err(AssetError::new(format!("prefab '{prefab}' is broken")));
        }
        self.instantiated.push(window);
        Ok(self.make_parts(window))
    }

    fn request_load(&mut self, key: &AssetKey) {
        self.requested.push(key.clone());
        self.polls.insert(key.clone(), 0);
    }

    fn poll_load(&mut self, key: &AssetKey) -> LoadStatus {
        let Some(polls) = self.polls.get_mut(key) else {
            return LoadStatus::Pending;
        };
        *polls += 1;
        let polls = *polls;
        match self.scripts.get(key) {
            None => LoadStatus::Ready(PrefabKey::new(key.as_str())),
            Some(LoadScript::Never) => LoadStatus::Pending,
            Some(LoadScript::ReadyAfter(n)) if polls > *n => {
                LoadStatus::Ready(PrefabKey::new(key.as_str()))
            }
            Some(LoadScript::FailAfter(n, reason)) if polls > *n => {
                LoadStatus::Failed(reason.clone())
            }
            Some(_) => LoadStatus::Pending,
        }
    }

    fn release(&mut self, key: &AssetKey) {
        self.released.push(key.clone());
        self.polls.remove(key);
    }
}

/// Log every window event as `"<Event>:<window name>"` and every layer
/// event as `"Layer<Event>:<layer name>"` into `log`.
pub fn record_events<B: AssetBackend, E: TransitionEngine>(
    manager: &mut WindowManager<B, E>,
    log: &EventLog,
) {
    let names: Rc<HashMap<WindowId, String>> = Rc::new(
        manager
            .registry()
            .windows()
            .map(|(id, def)| (id, def.name().to_string()))
            .collect(),
    );
    for event in WindowEvent::ALL {
        let names = names.clone();
        let log = log.clone();
        manager.subscribe_any(event, move |window| {
            let name = names.get(&window).map_or("?", String::as_str);
            log.push(format!("{event:?}:{name}"));
        });
    }

    let layers: Vec<(LayerId, String)> = manager
        .registry()
        .layers()
        .map(|(id, layer)| (id, layer.name().to_string()))
        .collect();
    for (layer, name) in layers {
        for event in [
            LayerEvent::Activated,
            LayerEvent::Deactivated,
            LayerEvent::GainedFocus,
            LayerEvent::LostFocus,
        ] {
            let log = log.clone();
            let name = name.clone();
            manager.subscribe_layer(event, layer, move || {
                log.push(format!("Layer{event:?}:{name}"));
            });
        }
    }
}
