#![forbid(unsafe_code)]

//! The window manager.
//!
//! [`WindowManager`] owns the registry, one [`WindowInstance`] slot and one
//! [`PrefabLoader`] per window definition, the per-layer sibling order, the
//! back-navigation history, focus, and the event bus.
//!
//! # Open sequence
//!
//! 1. Instantiate the window if it has no live instance. A deferred window
//!    that is not loaded yet is loaded first and opened once the load
//!    settles.
//! 2. Return if the window is already open.
//! 3. Fire `BeforeOpen`, snapshot the open windows.
//! 4. In an exclusive layer, start closing every other open window.
//! 5. Fire layer `Activated` if the layer was inactive.
//! 6. Record history if the layer is history-eligible.
//! 7. Bring the window to the front of its layer.
//! 8. Play the open transition (suspends).
//! 9. Recompute focus, fire `Opened`, then the transition pairs.
//!
//! Close mirrors it: `BeforeClose`, transition (suspends), layer
//! `Deactivated` if nothing in the layer is open anymore, focus, `Closed`.
//!
//! # Example
//!
//! ```
//! use layerdeck_core::{CollectionRegistry, Layer, WindowDefinition};
//! use layerdeck_runtime::testing::RecordingBackend;
//! use layerdeck_runtime::{ManagerConfig, WindowManager};
//!
//! let mut registry = CollectionRegistry::builder();
//! let main = registry.layer(Layer::new("Main"));
//! let home = registry.window(WindowDefinition::new("Home").in_layer(main).prefab("home"));
//! let registry = registry.build().unwrap();
//!
//! let backend = RecordingBackend::new(&registry);
//! let mut manager = WindowManager::new(registry, backend, ManagerConfig::default());
//! manager.open(home).unwrap();
//! assert!(manager.is_open(home));
//! assert_eq!(manager.focused(), Some(home));
//! ```

use std::time::Duration;

use layerdeck_core::{
    AnimatedTransitions, CollectionRegistry, GroupId, LayerId, TransitionEngine, WindowDefinition,
    WindowId,
};
use tracing::{debug, debug_span, error, warn};

use crate::backend::{AssetBackend, WindowParts};
use crate::command::Command;
use crate::config::ManagerConfig;
use crate::error::WindowError;
use crate::events::{EventBus, LayerEvent, SubscriptionId, WindowEvent};
use crate::focus::{self, ManualFocus};
use crate::history::History;
use crate::instance::{Completion, Ticket, TransitionPoll, WindowInstance, WindowState};
use crate::layers::LayerContainer;
use crate::loader::{LoadProgress, PrefabLoader};
use crate::task::{AfterLoad, LoadTask, Step, Task};

/// Orchestrates window instances across layers.
pub struct WindowManager<B, E = AnimatedTransitions> {
    registry: CollectionRegistry,
    backend: B,
    engine: E,
    config: ManagerConfig,
    containers: Vec<LayerContainer>,
    /// Whether each layer has fired `Activated` without a matching
    /// `Deactivated`.
    layer_active: Vec<bool>,
    instances: Vec<Option<WindowInstance>>,
    loaders: Vec<PrefabLoader>,
    history: History,
    focused: Option<WindowId>,
    manual_focus: ManualFocus,
    events: EventBus,
    tasks: Vec<Task>,
    next_ticket: u64,
    frame: u64,
}

impl<B: AssetBackend> WindowManager<B> {
    /// Manager with the built-in [`AnimatedTransitions`] engine.
    pub fn new(registry: CollectionRegistry, backend: B, config: ManagerConfig) -> Self {
        Self::with_engine(registry, backend, AnimatedTransitions, config)
    }
}

impl<B: AssetBackend, E: TransitionEngine> WindowManager<B, E> {
    pub fn with_engine(
        registry: CollectionRegistry,
        backend: B,
        engine: E,
        config: ManagerConfig,
    ) -> Self {
        let containers = (0..registry.layer_count())
            .map(|_| LayerContainer::new())
            .collect();
        let loaders = registry
            .windows()
            .map(|(_, def)| PrefabLoader::for_source(def.source()))
            .collect();
        let instances = (0..registry.window_count()).map(|_| None).collect();
        let history = match config.max_history {
            Some(limit) => History::with_limit(limit),
            None => History::new(),
        };
        Self {
            layer_active: vec![false; registry.layer_count()],
            registry,
            backend,
            engine,
            config,
            containers,
            instances,
            loaders,
            history,
            focused: None,
            manual_focus: ManualFocus::default(),
            events: EventBus::new(),
            tasks: Vec::new(),
            next_ticket: 0,
            frame: 0,
        }
    }

    /// Load the auto-loaded groups (if configured), then open the initial
    /// windows in order. Stops at the first window that fails to open.
    pub fn start(&mut self) -> Result<(), WindowError> {
        let _span = debug_span!("layerdeck.start").entered();
        if self.config.load_auto_groups {
            let groups: Vec<GroupId> = self
                .registry
                .groups()
                .filter(|(_, group)| group.is_auto_loaded())
                .map(|(id, _)| id)
                .collect();
            if !groups.is_empty() {
                self.start_load(&groups, None);
            }
        }
        let initial = self.config.initial_windows.clone();
        let result = initial.into_iter().try_for_each(|window| {
            self.check_window(window)?;
            self.open_inner(window, None)
        });
        self.pump();
        result
    }

    // -----------------------------------------------------------------------
    // Open / close
    // -----------------------------------------------------------------------

    /// Open `window`.
    ///
    /// A deferred window that is not loaded yet is loaded first and this
    /// returns `Ok(())` while the load is pending. If that load fails, the
    /// window is not opened and the failure is logged; it shows up in
    /// [`load_failure`](Self::load_failure) and the next `open` returns
    /// [`WindowError::LoadFailed`].
    pub fn open(&mut self, window: WindowId) -> Result<(), WindowError> {
        self.open_impl(window, None)
    }

    /// Open `window` and call `on_open` when its open transition completes.
    ///
    /// The callback is dropped without being called if the window is
    /// already open, if the open is cancelled by a close, or if the deferred
    /// load it waits for fails (see [`open`](Self::open)).
    pub fn open_with(
        &mut self,
        window: WindowId,
        on_open: impl FnOnce(WindowId) + 'static,
    ) -> Result<(), WindowError> {
        self.open_impl(window, Some(Box::new(on_open)))
    }

    pub fn close(&mut self, window: WindowId) -> Result<(), WindowError> {
        self.close_impl(window, None)
    }

    /// Close `window` and call `on_close` when its close transition
    /// completes. Dropped like [`open_with`](Self::open_with)'s callback.
    pub fn close_with(
        &mut self,
        window: WindowId,
        on_close: impl FnOnce(WindowId) + 'static,
    ) -> Result<(), WindowError> {
        self.close_impl(window, Some(Box::new(on_close)))
    }

    /// Pop the most recent history entry and close it.
    pub fn close_last(&mut self) {
        let _span = debug_span!("layerdeck.close_last").entered();
        self.close_last_inner();
        self.pump();
    }

    /// Close the most recent history entry and reopen the one below it,
    /// unless that one is still open.
    ///
    /// Does nothing when back navigation is disabled or the history holds
    /// fewer than two entries.
    pub fn back(&mut self) -> Result<(), WindowError> {
        let _span = debug_span!("layerdeck.back", history = self.history.len()).entered();
        if !self.config.back_enabled || self.history.len() <= 1 {
            debug!("back ignored");
            return Ok(());
        }
        self.close_last_inner();
        let mut result = Ok(());
        if let Some(top) = self.history.last() {
            if !self.is_open(top) {
                self.history.pop();
                result = self.open_inner(top, None);
            }
        }
        self.pump();
        result
    }

    pub fn execute(&mut self, command: Command) -> Result<(), WindowError> {
        match command {
            Command::Open(window) => self.open(window),
            Command::Close(window) => self.close(window),
            Command::CloseLast => {
                self.close_last();
                Ok(())
            }
            Command::Back => self.back(),
            Command::LoadGroups(groups) => self.load_groups(&groups),
            Command::UnloadGroups(groups) => self.unload_groups(&groups),
        }
    }

    fn open_impl(
        &mut self,
        window: WindowId,
        completion: Option<Completion>,
    ) -> Result<(), WindowError> {
        self.check_window(window)?;
        let _span = debug_span!("layerdeck.open", window = %self.name(window)).entered();
        let result = self.open_inner(window, completion);
        self.pump();
        result
    }

    fn close_impl(
        &mut self,
        window: WindowId,
        completion: Option<Completion>,
    ) -> Result<(), WindowError> {
        self.check_window(window)?;
        let _span = debug_span!("layerdeck.close", window = %self.name(window)).entered();
        self.close_inner(window, completion);
        self.pump();
        Ok(())
    }

    fn open_inner(
        &mut self,
        window: WindowId,
        completion: Option<Completion>,
    ) -> Result<(), WindowError> {
        if !self.ensure_instance(window)? {
            self.tasks.push(Task::Load(LoadTask {
                windows: vec![window],
                waiting: vec![window],
                last_poll: None,
                then: Some(AfterLoad::Open(completion)),
            }));
            return Ok(());
        }
        if self.is_open(window) {
            debug!(window = %self.name(window), "already open");
            return Ok(());
        }
        let (layer, spec) = match self.registry.window(window) {
            Some(def) => (def.layer(), def.transition_for_open().cloned()),
            None => return Err(WindowError::UnknownWindow(window)),
        };
        let (exclusive, in_history) = self
            .registry
            .layer(layer)
            .map_or((false, false), |l| (l.is_exclusive(), l.included_in_history()));

        self.events.emit_window(WindowEvent::BeforeOpen, window);
        let previously_open = self.open_windows();

        if exclusive {
            let siblings: Vec<WindowId> = previously_open
                .iter()
                .copied()
                .filter(|w| *w != window && self.layer_of(*w) == layer)
                .collect();
            for sibling in siblings {
                self.close_inner(sibling, None);
            }
        }

        if let Some(active) = self.layer_active.get_mut(layer.index()) {
            if !*active {
                *active = true;
                debug!(layer = %layer, "layer activated");
                self.events.emit_layer(LayerEvent::Activated, layer);
            }
        }

        if in_history {
            self.history.push(window);
        }
        if let Some(container) = self.containers.get_mut(layer.index()) {
            container.bring_to_front(window);
        }

        let ticket = self.issue_ticket();
        let Some(instance) = self.instances.get_mut(window.index()).and_then(Option::as_mut) else {
            return Ok(());
        };
        if let Some(ticket) = instance.begin_open(ticket, spec.as_ref(), &mut self.engine, completion)
        {
            debug!(window = %self.name(window), "opening");
            self.tasks.push(Task::Open {
                window,
                ticket,
                previously_open,
            });
        }
        Ok(())
    }

    fn close_inner(&mut self, window: WindowId, completion: Option<Completion>) {
        if !self.is_open(window) {
            return;
        }
        let spec = self
            .registry
            .window(window)
            .and_then(WindowDefinition::transition_for_close)
            .cloned();
        self.events.emit_window(WindowEvent::BeforeClose, window);

        let ticket = self.issue_ticket();
        let Some(instance) = self.instances.get_mut(window.index()).and_then(Option::as_mut) else {
            return;
        };
        if let Some(ticket) =
            instance.begin_close(ticket, spec.as_ref(), &mut self.engine, completion)
        {
            debug!(window = %self.name(window), "closing");
            self.tasks.push(Task::Close { window, ticket });
        }
    }

    fn close_last_inner(&mut self) {
        if let Some(last) = self.history.pop() {
            self.close_inner(last, None);
        }
    }

    // -----------------------------------------------------------------------
    // Instances
    // -----------------------------------------------------------------------

    /// Make sure `window` has a live instance.
    ///
    /// Returns `Ok(false)` if a deferred load is in flight; the load is
    /// started if it was not.
    fn ensure_instance(&mut self, window: WindowId) -> Result<bool, WindowError> {
        if self.has_instance(window) {
            return Ok(true);
        }
        let Some(loader) = self.loaders.get(window.index()) else {
            return Err(WindowError::UnknownWindow(window));
        };
        if loader.is_async() && !loader.is_loaded() {
            if let Some(reason) = loader.failure() {
                return Err(WindowError::LoadFailed {
                    window: self.name(window).to_string(),
                    reason: reason.to_string(),
                });
            }
            warn!(window = %self.name(window), "window is not loaded, loading it before opening");
            self.request_load(window);
            return Ok(false);
        }
        self.instantiate(window)?;
        Ok(true)
    }

    fn instantiate(&mut self, window: WindowId) -> Result<(), WindowError> {
        let Some(def) = self.registry.window(window) else {
            return Err(WindowError::UnknownWindow(window));
        };
        let name = def.name().to_string();
        let layer = def.layer();
        let block = def.blocks_interaction();

        let Some(prefab) = self
            .loaders
            .get(window.index())
            .and_then(PrefabLoader::prefab)
            .cloned()
        else {
            error!(window = %name, "window has no prefab assigned, cannot instantiate");
            return Err(WindowError::MissingPrefab { window: name });
        };
        let parts = match self.backend.instantiate(window, &prefab, layer) {
            Ok(parts) => parts,
            Err(source) => {
                error!(window = %name, prefab = %prefab, error = %source, "failed to instantiate window");
                return Err(WindowError::Instantiate {
                    window: name,
                    source,
                });
            }
        };
        self.register_instance(window, parts, block);
        Ok(())
    }

    fn register_instance(&mut self, window: WindowId, parts: WindowParts, block: bool) {
        let mut instance = WindowInstance::new(window, parts, block);
        instance.initialize();
        let layer = self.layer_of(window);
        if let Some(container) = self.containers.get_mut(layer.index()) {
            container.insert(window);
        }
        if let Some(slot) = self.instances.get_mut(window.index()) {
            *slot = Some(instance);
        }
        debug!(window = %self.name(window), layer = %layer, "window instantiated");
        self.events.emit_window(WindowEvent::WindowInitialized, window);
    }

    /// Register a visual object that already exists for `window`.
    ///
    /// If the window already has a live instance, the new one replaces it:
    /// the stale instance is unloaded and a warning is logged.
    pub fn adopt(&mut self, window: WindowId, parts: WindowParts) -> Result<(), WindowError> {
        self.check_window(window)?;
        let _span = debug_span!("layerdeck.adopt", window = %self.name(window)).entered();
        if self.has_instance(window) {
            warn!(window = %self.name(window), "duplicate live instance, unloading the stale one");
            self.unload_inner(window);
        }
        let block = self
            .registry
            .window(window)
            .is_some_and(WindowDefinition::blocks_interaction);
        self.register_instance(window, parts, block);
        self.refresh_focus();
        self.pump();
        Ok(())
    }

    fn unload_inner(&mut self, window: WindowId) {
        let Some(state) = self.instance(window).map(WindowInstance::state) else {
            return;
        };
        let layer = self.layer_of(window);

        self.events.emit_window(WindowEvent::BeforeDestroy, window);
        // A window dropped mid-close never reaches its close tail, so it is
        // closed here.
        if state.is_open() || state.is_transitioning() {
            self.events.emit_window(WindowEvent::Closed, window);
        }
        if let Some(instance) = self.instances.get_mut(window.index()).and_then(Option::take) {
            instance.destroy();
        }
        if let Some(container) = self.containers.get_mut(layer.index()) {
            container.remove(window);
        }
        self.release_asset(window);
        debug!(window = %self.name(window), "window destroyed");
        self.events.emit_window(WindowEvent::Destroyed, window);

        self.deactivate_layer_if_idle(layer);
    }

    fn release_asset(&mut self, window: WindowId) {
        if let Some(loader) = self.loaders.get_mut(window.index()) {
            if loader.unload(&mut self.backend) {
                debug!(window = %self.name(window), "released loaded asset");
            }
        }
    }

    /// Remove `windows` from every load still in flight so nothing is
    /// instantiated or opened for them once the load settles.
    fn forget_pending_loads(&mut self, windows: &[WindowId]) {
        for task in &mut self.tasks {
            if let Task::Load(load) = task {
                load.windows.retain(|w| !windows.contains(w));
                load.waiting.retain(|w| !windows.contains(w));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    pub fn load_group(&mut self, group: GroupId) -> Result<(), WindowError> {
        self.load_groups_impl(&[group], None)
    }

    /// Load `group` and call `on_loaded` once every window in it is
    /// instantiated (or has failed to load).
    pub fn load_group_with(
        &mut self,
        group: GroupId,
        on_loaded: impl FnOnce() + 'static,
    ) -> Result<(), WindowError> {
        self.load_groups_impl(&[group], Some(Box::new(on_loaded)))
    }

    pub fn load_groups(&mut self, groups: &[GroupId]) -> Result<(), WindowError> {
        self.load_groups_impl(groups, None)
    }

    pub fn unload_group(&mut self, group: GroupId) -> Result<(), WindowError> {
        self.unload_groups(&[group])
    }

    /// Destroy every live instance in `groups` and release deferred assets.
    pub fn unload_groups(&mut self, groups: &[GroupId]) -> Result<(), WindowError> {
        for group in groups {
            self.check_group(*group)?;
        }
        let _span = debug_span!("layerdeck.unload_groups", groups = groups.len()).entered();
        let windows = self.registry.windows_in_groups(groups);
        self.forget_pending_loads(&windows);
        for window in windows {
            if self.has_instance(window) {
                self.unload_inner(window);
            } else {
                self.release_asset(window);
            }
        }
        self.refresh_focus();
        self.pump();
        Ok(())
    }

    fn load_groups_impl(
        &mut self,
        groups: &[GroupId],
        callback: Option<Box<dyn FnOnce()>>,
    ) -> Result<(), WindowError> {
        for group in groups {
            self.check_group(*group)?;
        }
        let _span = debug_span!("layerdeck.load_groups", groups = groups.len()).entered();
        self.start_load(groups, callback);
        self.pump();
        Ok(())
    }

    fn start_load(&mut self, groups: &[GroupId], callback: Option<Box<dyn FnOnce()>>) {
        let windows: Vec<WindowId> = self
            .registry
            .windows_in_groups(groups)
            .into_iter()
            .filter(|w| !self.has_instance(*w))
            .collect();
        let mut waiting = Vec::new();
        for &window in &windows {
            if self.loaders.get(window.index()).is_some_and(PrefabLoader::is_async) {
                self.request_load(window);
                waiting.push(window);
            }
        }
        debug!(windows = windows.len(), waiting = waiting.len(), "group load started");
        self.tasks.push(Task::Load(LoadTask {
            windows,
            waiting,
            last_poll: None,
            then: Some(AfterLoad::Instantiate(callback)),
        }));
    }

    fn request_load(&mut self, window: WindowId) {
        let started = self
            .loaders
            .get_mut(window.index())
            .is_some_and(|loader| loader.load(&mut self.backend));
        if started {
            debug!(window = %self.name(window), "load requested");
            self.events.emit_window(WindowEvent::BeforeLoad, window);
        }
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Advance transitions by `dt`, then resume every task that can make
    /// progress.
    pub fn tick(&mut self, dt: Duration) {
        self.frame = self.frame.wrapping_add(1);
        for instance in self.instances.iter_mut().flatten() {
            instance.advance(dt, &mut self.engine);
        }
        self.pump();
    }

    /// Tick with `step` until no task is pending, at most `max_ticks` times.
    /// Returns whether the manager went idle.
    pub fn run_until_idle(&mut self, step: Duration, max_ticks: usize) -> bool {
        for _ in 0..max_ticks {
            if self.is_idle() {
                return true;
            }
            self.tick(step);
        }
        self.is_idle()
    }

    /// Whether no open, close or load is in flight.
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    fn pump(&mut self) {
        loop {
            let tasks = std::mem::take(&mut self.tasks);
            let mut pending = Vec::with_capacity(tasks.len());
            let mut progressed = false;
            for mut task in tasks {
                match self.poll_task(&mut task) {
                    Step::Pending => pending.push(task),
                    Step::Done => progressed = true,
                }
            }
            pending.append(&mut self.tasks);
            self.tasks = pending;
            if !progressed {
                break;
            }
        }
    }

    fn poll_task(&mut self, task: &mut Task) -> Step {
        match task {
            Task::Open {
                window,
                ticket,
                previously_open,
            } => {
                let window = *window;
                match self.poll_instance(window, *ticket) {
                    TransitionPoll::Pending => Step::Pending,
                    TransitionPoll::Cancelled => {
                        debug!(window = %self.name(window), "open cancelled");
                        Step::Done
                    }
                    TransitionPoll::Finished => {
                        debug!(window = %self.name(window), "opened");
                        self.refresh_focus();
                        self.events.emit_window(WindowEvent::Opened, window);
                        self.events.emit_transitions(previously_open.as_slice(), window);
                        Step::Done
                    }
                }
            }
            Task::Close { window, ticket } => {
                let window = *window;
                match self.poll_instance(window, *ticket) {
                    TransitionPoll::Pending => Step::Pending,
                    TransitionPoll::Cancelled => {
                        debug!(window = %self.name(window), "close cancelled");
                        Step::Done
                    }
                    TransitionPoll::Finished => {
                        debug!(window = %self.name(window), "closed");
                        self.deactivate_layer_if_idle(self.layer_of(window));
                        self.refresh_focus();
                        self.events.emit_window(WindowEvent::Closed, window);
                        Step::Done
                    }
                }
            }
            Task::Load(load) => self.poll_load_task(load),
        }
    }

    fn poll_instance(&mut self, window: WindowId, ticket: Ticket) -> TransitionPoll {
        match self.instances.get_mut(window.index()).and_then(Option::as_mut) {
            Some(instance) => instance.poll(ticket),
            None => TransitionPoll::Cancelled,
        }
    }

    fn poll_load_task(&mut self, task: &mut LoadTask) -> Step {
        if !task.waiting.is_empty() {
            if task.last_poll == Some(self.frame) {
                return Step::Pending;
            }
            task.last_poll = Some(self.frame);

            let mut still_waiting = Vec::new();
            for window in std::mem::take(&mut task.waiting) {
                let progress = match self.loaders.get_mut(window.index()) {
                    Some(loader) => loader.poll(&mut self.backend),
                    None => LoadProgress::Idle,
                };
                if !progress.is_settled() {
                    still_waiting.push(window);
                    continue;
                }
                match progress {
                    LoadProgress::JustLoaded => {
                        debug!(window = %self.name(window), "loaded");
                        self.events.emit_window(WindowEvent::Loaded, window);
                    }
                    LoadProgress::JustFailed(reason) => {
                        error!(window = %self.name(window), reason = %reason, "window failed to load");
                    }
                    LoadProgress::Pending
                    | LoadProgress::Loaded
                    | LoadProgress::Failed
                    | LoadProgress::Idle => {}
                }
            }
            task.waiting = still_waiting;
            if !task.waiting.is_empty() {
                return Step::Pending;
            }
        }

        match task.then.take() {
            Some(AfterLoad::Instantiate(callback)) => {
                for &window in &task.windows {
                    let ready = self
                        .loaders
                        .get(window.index())
                        .is_some_and(PrefabLoader::is_loaded);
                    if ready && !self.has_instance(window) {
                        // Failures are logged by `instantiate`.
                        let _ = self.instantiate(window);
                    }
                }
                if let Some(callback) = callback {
                    callback();
                }
            }
            Some(AfterLoad::Open(completion)) => {
                if let Some(&window) = task.windows.first() {
                    let ready = self
                        .loaders
                        .get(window.index())
                        .is_some_and(PrefabLoader::is_loaded);
                    if ready {
                        if let Err(e) = self.open_inner(window, completion) {
                            warn!(window = %self.name(window), error = %e, "deferred open failed");
                        }
                    }
                }
            }
            None => {}
        }
        Step::Done
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// Hand focus to an external object. Window focus is cleared while any
    /// key is registered.
    pub fn add_manual_focus(&mut self, key: impl Into<String>) {
        self.manual_focus.add(key);
        self.refresh_focus();
    }

    pub fn remove_manual_focus(&mut self, key: &str) {
        if self.manual_focus.remove(key) {
            self.refresh_focus();
        }
    }

    fn refresh_focus(&mut self) {
        let instances = &self.instances;
        let registry = &self.registry;
        let next = focus::resolve(
            &self.containers,
            &self.manual_focus,
            |w| {
                instances
                    .get(w.index())
                    .and_then(Option::as_ref)
                    .is_some_and(WindowInstance::is_open)
            },
            |w| registry.window(w).is_some_and(WindowDefinition::is_focusable),
        );
        self.set_focused(next);
    }

    fn set_focused(&mut self, next: Option<WindowId>) {
        if next == self.focused {
            return;
        }
        let previous = self.focused;
        if let Some(old) = previous {
            if let Some(instance) = self.instances.get_mut(old.index()).and_then(Option::as_mut) {
                instance.notify_lost_focus();
            }
            self.events.emit_window(WindowEvent::LostFocus, old);
        }
        self.focused = next;
        if let Some(new) = next {
            if let Some(instance) = self.instances.get_mut(new.index()).and_then(Option::as_mut) {
                instance.notify_gain_focus();
            }
            self.events.emit_window(WindowEvent::GainedFocus, new);
        }
        debug!(
            from = ?previous.map(|w| self.name(w)),
            to = ?next.map(|w| self.name(w)),
            "focus changed"
        );

        let old_layer = previous.map(|w| self.layer_of(w));
        let new_layer = next.map(|w| self.layer_of(w));
        if old_layer != new_layer {
            if let Some(layer) = old_layer {
                self.events.emit_layer(LayerEvent::LostFocus, layer);
            }
            if let Some(layer) = new_layer {
                self.events.emit_layer(LayerEvent::GainedFocus, layer);
            }
            self.events.emit_layer_focus_changed(old_layer, new_layer);
        }
    }

    fn deactivate_layer_if_idle(&mut self, layer: LayerId) {
        let idle = self.open_windows_in(layer).is_empty();
        if let Some(active) = self.layer_active.get_mut(layer.index()) {
            if idle && *active {
                *active = false;
                debug!(layer = %layer, "layer deactivated");
                self.events.emit_layer(LayerEvent::Deactivated, layer);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn subscribe_window(
        &mut self,
        event: WindowEvent,
        window: WindowId,
        callback: impl FnMut() + 'static,
    ) -> SubscriptionId {
        self.events.subscribe_window(event, window, callback)
    }

    pub fn subscribe_any(
        &mut self,
        event: WindowEvent,
        callback: impl FnMut(WindowId) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe_any(event, callback)
    }

    pub fn subscribe_transition(
        &mut self,
        from: WindowId,
        to: WindowId,
        callback: impl FnMut() + 'static,
    ) -> SubscriptionId {
        self.events.subscribe_transition(from, to, callback)
    }

    pub fn subscribe_layer(
        &mut self,
        event: LayerEvent,
        layer: LayerId,
        callback: impl FnMut() + 'static,
    ) -> SubscriptionId {
        self.events.subscribe_layer(event, layer, callback)
    }

    pub fn subscribe_layer_focus_changed(
        &mut self,
        callback: impl FnMut(Option<LayerId>, Option<LayerId>) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe_layer_focus_changed(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Queries and settings
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn instance(&self, window: WindowId) -> Option<&WindowInstance> {
        self.instances.get(window.index()).and_then(Option::as_ref)
    }

    pub fn has_instance(&self, window: WindowId) -> bool {
        self.instance(window).is_some()
    }

    /// Whether `window` is open or opening.
    pub fn is_open(&self, window: WindowId) -> bool {
        self.instance(window).is_some_and(WindowInstance::is_open)
    }

    /// Reason the last asynchronous load of `window` failed, if it did and
    /// no load was requested since.
    pub fn load_failure(&self, window: WindowId) -> Option<&str> {
        self.loaders.get(window.index()).and_then(PrefabLoader::failure)
    }

    /// Lifecycle state; `Uninitialized` for a window without an instance.
    pub fn state(&self, window: WindowId) -> WindowState {
        self.instance(window)
            .map_or(WindowState::Uninitialized, WindowInstance::state)
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn focused_layer(&self) -> Option<LayerId> {
        self.focused.map(|w| self.layer_of(w))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Open windows in registry order.
    pub fn open_windows(&self) -> Vec<WindowId> {
        self.instances
            .iter()
            .flatten()
            .filter(|i| i.is_open())
            .map(WindowInstance::window)
            .collect()
    }

    /// Open windows of `layer`, back to front.
    pub fn open_windows_in(&self, layer: LayerId) -> Vec<WindowId> {
        self.containers
            .get(layer.index())
            .map(|c| c.iter().filter(|w| self.is_open(*w)).collect::<Vec<_>>())
            .unwrap_or_default()
    }

    /// Position of `window` in its layer, 0 = backmost.
    pub fn sibling_index(&self, window: WindowId) -> Option<usize> {
        self.containers
            .get(self.layer_of(window).index())
            .and_then(|c| c.sibling_index(window))
    }

    /// Include or exclude `layer` from history recording from now on.
    pub fn set_layer_in_history(&mut self, layer: LayerId, included: bool) -> Result<(), WindowError> {
        let layer_def = self
            .registry
            .layer_mut(layer)
            .ok_or(WindowError::UnknownLayer(layer))?;
        layer_def.set_included_in_history(included);
        Ok(())
    }

    fn layer_of(&self, window: WindowId) -> LayerId {
        self.registry
            .window(window)
            .map_or(LayerId::default(), WindowDefinition::layer)
    }

    fn name(&self, window: WindowId) -> &str {
        self.registry
            .window(window)
            .map_or("<unknown>", WindowDefinition::name)
    }

    fn check_window(&self, window: WindowId) -> Result<(), WindowError> {
        match self.registry.window(window) {
            Some(_) => Ok(()),
            None => Err(WindowError::UnknownWindow(window)),
        }
    }

    fn check_group(&self, group: GroupId) -> Result<(), WindowError> {
        match self.registry.group(group) {
            Some(_) => Ok(()),
            None => Err(WindowError::UnknownGroup(group)),
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }
}
