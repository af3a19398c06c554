#![forbid(unsafe_code)]

//! Group loading, deferred assets, unloading and adoption.

use std::error::Error;
use std::time::Duration;

use layerdeck_core::{
    AssetKey, CollectionRegistry, Group, GroupId, Layer, LayerId, TransitionSpec,
    WindowDefinition, WindowId,
};
use layerdeck_runtime::testing::{EventLog, LoadScript, RecordingBackend, record_events};
use layerdeck_runtime::{Command, ManagerConfig, WindowError, WindowManager, WindowState};

const FRAME: Duration = Duration::from_millis(16);

struct Deck {
    manager: WindowManager<RecordingBackend>,
    events: EventLog,
    popup: LayerId,
    core: GroupId,
    shop: GroupId,
    extras: GroupId,
    home: WindowId,
    store: WindowId,
    cart: WindowId,
    orphan: WindowId,
}

/// Core (auto): Home. Shop (manual): Store (deferred) and Cart.
/// Extras (manual): Cart. Orphan has no template.
fn deck(scripts: &[(&str, LoadScript)]) -> Deck {
    let mut b = CollectionRegistry::builder();
    let main = b.layer(Layer::new("Main"));
    let popup = b.layer(Layer::new("Popup"));
    let core = b.group(Group::new("Core"));
    let shop = b.group(Group::new("Shop").auto_loaded(false));
    let extras = b.group(Group::new("Extras").auto_loaded(false));
    let home = b.window(
        WindowDefinition::new("Home")
            .in_layer(main)
            .in_group(core)
            .prefab("home"),
    );
    let store = b.window(
        WindowDefinition::new("Store")
            .in_layer(main)
            .in_group(shop)
            .deferred("store.bundle"),
    );
    let cart = b.window(
        WindowDefinition::new("Cart")
            .in_layer(popup)
            .in_group(shop)
            .in_group(extras)
            .prefab("cart")
            .transition_in(TransitionSpec::fade_in(Duration::from_millis(100))),
    );
    let orphan = b.window(WindowDefinition::new("Orphan").in_layer(popup));
    let registry = b.build().unwrap();

    let mut backend = RecordingBackend::new(&registry);
    for (key, script) in scripts {
        backend.script(key, script.clone());
    }
    let mut manager = WindowManager::new(registry, backend, ManagerConfig::default());
    let events = EventLog::new();
    record_events(&mut manager, &events);
    Deck {
        manager,
        events,
        popup,
        core,
        shop,
        extras,
        home,
        store,
        cart,
        orphan,
    }
}

#[test]
fn start_loads_auto_groups_only() {
    let mut d = deck(&[]);
    d.manager.start().unwrap();
    assert_eq!(d.manager.state(d.home), WindowState::Closed);
    assert!(!d.manager.has_instance(d.store));
    assert!(!d.manager.has_instance(d.cart));
    assert_eq!(d.events.entries(), vec!["WindowInitialized:Home"]);
}

#[test]
fn start_can_skip_auto_groups() {
    let mut b = CollectionRegistry::builder();
    let main = b.layer(Layer::new("Main"));
    let core = b.group(Group::new("Core"));
    let home = b.window(WindowDefinition::new("Home").in_layer(main).in_group(core).prefab("home"));
    let registry = b.build().unwrap();
    let backend = RecordingBackend::new(&registry);
    let config = ManagerConfig::default().load_auto_groups(false);
    let mut manager = WindowManager::new(registry, backend, config);
    manager.start().unwrap();
    assert!(!manager.has_instance(home));
}

#[test]
fn async_group_load_completes_after_polls() {
    let mut d = deck(&[("store.bundle", LoadScript::ReadyAfter(2))]);
    let done = EventLog::new();
    let log = done.clone();
    d.manager
        .load_group_with(d.shop, move || log.push("loaded"))
        .unwrap();

    assert!(done.is_empty());
    assert!(!d.manager.has_instance(d.cart), "sync windows wait for the async ones");
    d.manager.tick(FRAME);
    assert!(done.is_empty());
    d.manager.tick(FRAME);
    assert_eq!(done.entries(), vec!["loaded"]);

    assert_eq!(
        d.events.entries(),
        vec![
            "BeforeLoad:Store",
            "Loaded:Store",
            "WindowInitialized:Store",
            "WindowInitialized:Cart",
        ]
    );
    assert_eq!(d.manager.backend().requested(), &[AssetKey::new("store.bundle")]);
    assert!(d.manager.is_idle());
}

#[test]
fn sync_only_group_completes_within_the_call() {
    let mut d = deck(&[]);
    let done = EventLog::new();
    let log = done.clone();
    d.manager
        .load_group_with(d.extras, move || log.push("loaded"))
        .unwrap();
    assert_eq!(done.entries(), vec!["loaded"]);
    assert_eq!(d.manager.state(d.cart), WindowState::Closed);
    assert!(d.manager.backend().requested().is_empty());
}

#[test]
fn loading_a_loaded_group_again_is_harmless() {
    let mut d = deck(&[]);
    d.manager.load_group(d.shop).unwrap();
    d.manager.load_group(d.shop).unwrap();
    assert_eq!(d.events.count("WindowInitialized:Cart"), 1);
    assert_eq!(d.events.count("BeforeLoad:Store"), 1);
    assert_eq!(d.manager.backend().instantiated(), &[d.store, d.cart]);
}

#[test]
fn failed_load_reports_on_open_and_can_be_retried() {
    let mut d = deck(&[("store.bundle", LoadScript::FailAfter(0, "404".into()))]);
    d.manager.load_group(d.shop).unwrap();
    assert!(!d.manager.has_instance(d.store));
    assert!(d.manager.has_instance(d.cart));
    assert!(!d.events.contains("Loaded:Store"));

    match d.manager.open(d.store) {
        Err(WindowError::LoadFailed { window, reason }) => {
            assert_eq!(window, "Store");
            assert_eq!(reason, "404");
        }
        other => panic!("expected LoadFailed, got {other:?}"),
    }

    d.manager
        .backend_mut()
        .script("store.bundle", LoadScript::ReadyAfter(0));
    d.manager.load_group(d.shop).unwrap();
    assert!(d.manager.has_instance(d.store));
    d.manager.open(d.store).unwrap();
    assert!(d.manager.is_open(d.store));
    assert_eq!(d.events.count("BeforeLoad:Store"), 2);
}

#[test]
fn opening_an_unloaded_deferred_window_loads_it_first() {
    let mut d = deck(&[("store.bundle", LoadScript::ReadyAfter(1))]);
    let done = EventLog::new();
    let log = done.clone();
    d.manager
        .open_with(d.store, move |_| log.push("opened"))
        .unwrap();
    assert!(!d.manager.is_open(d.store));
    assert!(d.events.contains("BeforeLoad:Store"));

    d.manager.tick(FRAME);
    assert!(d.manager.is_open(d.store));
    assert_eq!(done.entries(), vec!["opened"]);
    let loaded = d.events.position("Loaded:Store").unwrap();
    let initialized = d.events.position("WindowInitialized:Store").unwrap();
    let opened = d.events.position("Opened:Store").unwrap();
    assert!(loaded < initialized && initialized < opened);
}

#[test]
fn loads_are_polled_once_per_frame() {
    let mut d = deck(&[("store.bundle", LoadScript::Never)]);
    d.manager.load_group(d.shop).unwrap();
    assert_eq!(d.manager.backend().polls("store.bundle"), 1);

    d.manager.open(d.orphan).unwrap_err();
    d.manager.close(d.home).unwrap();
    assert_eq!(d.manager.backend().polls("store.bundle"), 1);

    d.manager.tick(FRAME);
    d.manager.tick(FRAME);
    assert_eq!(d.manager.backend().polls("store.bundle"), 3);
    assert!(!d.manager.is_idle());
}

#[test]
fn unload_tears_down_in_order() {
    let mut d = deck(&[]);
    d.manager.start().unwrap();
    d.manager.open(d.home).unwrap();
    let probe = d.manager.backend().probe(d.home).unwrap();
    d.events.clear();

    d.manager.unload_group(d.core).unwrap();
    let entries = d.events.entries();
    assert_eq!(
        &entries[..4],
        &[
            "BeforeDestroy:Home",
            "Closed:Home",
            "Destroyed:Home",
            "LayerDeactivated:Main",
        ]
    );
    assert!(probe.is_destroyed());
    assert!(!d.manager.has_instance(d.home));
    assert_eq!(d.manager.focused(), None);
    assert!(d.manager.open_windows().is_empty());
}

#[test]
fn unload_releases_deferred_assets() {
    let mut d = deck(&[]);
    d.manager.load_group(d.shop).unwrap();
    d.manager.execute(Command::UnloadGroups(vec![d.shop])).unwrap();
    assert_eq!(d.manager.backend().released(), &[AssetKey::new("store.bundle")]);
    assert!(!d.manager.has_instance(d.store));
    assert!(!d.manager.has_instance(d.cart));

    d.manager.execute(Command::LoadGroups(vec![d.shop])).unwrap();
    assert!(d.manager.has_instance(d.store));
    assert_eq!(d.manager.backend().requested().len(), 2);
}

#[test]
fn unload_during_open_transition_cancels_it() {
    let mut d = deck(&[]);
    d.manager.load_group(d.extras).unwrap();
    d.manager.open(d.cart).unwrap();
    assert_eq!(d.manager.state(d.cart), WindowState::Opening);

    d.manager.unload_group(d.extras).unwrap();
    assert!(d.manager.run_until_idle(FRAME, 20));
    assert!(!d.events.contains("Opened:Cart"));
    assert!(d.events.contains("Closed:Cart"));
    assert!(d.events.contains("LayerDeactivated:Popup"));
    assert!(d.manager.open_windows_in(d.popup).is_empty());
}

#[test]
fn adopting_a_duplicate_replaces_the_stale_instance() {
    let mut d = deck(&[]);
    d.manager.start().unwrap();
    let stale = d.manager.backend().probe(d.home).unwrap();

    let parts = d.manager.backend_mut().make_parts(d.home);
    d.manager.adopt(d.home, parts).unwrap();
    let fresh = d.manager.backend().probe(d.home).unwrap();

    assert!(stale.is_destroyed());
    assert!(!fresh.is_destroyed());
    assert_eq!(d.events.count("WindowInitialized:Home"), 2);
    assert!(d.events.contains("Destroyed:Home"));
    d.manager.open(d.home).unwrap();
    assert!(fresh.is_active());
}

#[test]
fn template_less_window_can_only_be_adopted() {
    let mut d = deck(&[]);
    assert!(matches!(
        d.manager.open(d.orphan),
        Err(WindowError::MissingPrefab { window }) if window == "Orphan"
    ));
    assert!(!d.manager.has_instance(d.orphan));

    let parts = d.manager.backend_mut().make_parts(d.orphan);
    d.manager.adopt(d.orphan, parts).unwrap();
    d.manager.open(d.orphan).unwrap();
    assert!(d.manager.is_open(d.orphan));
}

#[test]
fn broken_template_surfaces_backend_error() {
    let mut d = deck(&[]);
    d.manager.backend_mut().break_prefab("cart");
    let err = d.manager.open(d.cart).unwrap_err();
    assert!(matches!(err, WindowError::Instantiate { .. }));
    assert!(err.source().is_some());
    assert!(!d.manager.has_instance(d.cart));
    assert!(d.events.is_empty());
}

#[test]
fn unknown_group_is_an_error() {
    let mut other = CollectionRegistry::builder();
    let mut foreign = None;
    for i in 0..5 {
        foreign = Some(other.group(Group::new(format!("G{i}"))));
    }
    let foreign = foreign.unwrap();

    let mut d = deck(&[]);
    assert!(matches!(
        d.manager.load_group(foreign),
        Err(WindowError::UnknownGroup(id)) if id == foreign
    ));
    assert!(matches!(
        d.manager.unload_groups(&[d.core, foreign]),
        Err(WindowError::UnknownGroup(_))
    ));
    assert!(d.events.is_empty());
}

#[test]
fn unload_during_close_transition_still_closes_and_deactivates() {
    let mut b = CollectionRegistry::builder();
    let main = b.layer(Layer::new("Main"));
    let menus = b.group(Group::new("Menus").auto_loaded(false));
    let pause = b.window(
        WindowDefinition::new("Pause")
            .in_layer(main)
            .in_group(menus)
            .prefab("pause")
            .transition_out(TransitionSpec::fade_out(Duration::from_millis(100))),
    );
    let registry = b.build().unwrap();
    let backend = RecordingBackend::new(&registry);
    let mut manager = WindowManager::new(registry, backend, ManagerConfig::default());
    let events = EventLog::new();
    record_events(&mut manager, &events);

    manager.load_group(menus).unwrap();
    manager.open(pause).unwrap();
    manager.close(pause).unwrap();
    manager.tick(FRAME);
    assert_eq!(manager.state(pause), WindowState::Closing);

    manager.unload_group(menus).unwrap();
    assert!(manager.run_until_idle(FRAME, 20));
    assert_eq!(events.count("Closed:Pause"), 1);
    assert_eq!(events.count("LayerDeactivated:Main"), 1);
    let closed = events.position("Closed:Pause").unwrap();
    assert!(events.position("BeforeDestroy:Pause").unwrap() < closed);
    assert!(closed < events.position("Destroyed:Pause").unwrap());

    manager.load_group(menus).unwrap();
    manager.open(pause).unwrap();
    assert_eq!(events.count("LayerActivated:Main"), 2);
}

#[test]
fn unload_while_group_load_is_pending_drops_the_load() {
    let mut d = deck(&[("store.bundle", LoadScript::ReadyAfter(2))]);
    let done = EventLog::new();
    let log = done.clone();
    d.manager
        .load_group_with(d.shop, move || log.push("loaded"))
        .unwrap();
    assert!(d.events.contains("BeforeLoad:Store"));

    d.manager.unload_group(d.shop).unwrap();
    assert_eq!(d.manager.backend().released(), &[AssetKey::new("store.bundle")]);
    assert!(d.manager.run_until_idle(FRAME, 20));

    assert!(!d.manager.has_instance(d.store));
    assert!(!d.manager.has_instance(d.cart));
    assert!(!d.events.contains("Loaded:Store"));
    assert!(!d.events.contains("WindowInitialized:Cart"));
    assert_eq!(done.entries(), vec!["loaded"]);

    d.manager.load_group(d.shop).unwrap();
    assert!(d.manager.run_until_idle(FRAME, 20));
    assert!(d.manager.has_instance(d.store));
    assert!(d.manager.has_instance(d.cart));
    assert_eq!(d.manager.backend().requested().len(), 2);
}

#[test]
fn unload_while_deferred_open_is_pending_never_opens() {
    let mut d = deck(&[("store.bundle", LoadScript::ReadyAfter(2))]);
    let done = EventLog::new();
    let log = done.clone();
    d.manager
        .open_with(d.store, move |_| log.push("opened"))
        .unwrap();

    d.manager.unload_group(d.shop).unwrap();
    assert!(d.manager.run_until_idle(FRAME, 20));
    assert!(!d.manager.has_instance(d.store));
    assert!(!d.events.contains("Opened:Store"));
    assert!(done.is_empty());
}

#[test]
fn failed_deferred_open_is_observable() {
    let mut d = deck(&[("store.bundle", LoadScript::FailAfter(1, "offline".into()))]);
    let done = EventLog::new();
    let log = done.clone();
    d.manager
        .open_with(d.store, move |_| log.push("opened"))
        .unwrap();
    assert_eq!(d.manager.load_failure(d.store), None);

    assert!(d.manager.run_until_idle(FRAME, 20));
    assert!(!d.manager.is_open(d.store));
    assert!(done.is_empty());
    assert!(!d.events.contains("BeforeOpen:Store"));
    assert_eq!(d.manager.load_failure(d.store), Some("offline"));
    assert!(matches!(
        d.manager.open(d.store),
        Err(WindowError::LoadFailed { .. })
    ));
}
