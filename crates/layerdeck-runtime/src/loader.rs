#![forbid(unsafe_code)]

//! Per-window template loaders.
//!
//! Every window definition gets one [`PrefabLoader`] for the lifetime of the
//! manager. A direct loader is always loaded; a deferred one walks
//! `Idle → Loading → Loaded | Failed` and back to `Idle` on unload.

use layerdeck_core::{AssetKey, PrefabKey, WindowSource};

use crate::backend::{AssetBackend, LoadStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading,
    Loaded(PrefabKey),
    Failed(String),
}

/// What a poll observed.
///
/// The `Just*` variants are returned exactly once, on the poll that saw the
/// load resolve, so the `Loaded` event and the failure log fire once no
/// matter how many tasks wait on the same loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProgress {
    /// No load was requested, or the asset was released.
    Idle,
    Pending,
    JustLoaded,
    Loaded,
    JustFailed(String),
    Failed,
}

impl LoadProgress {
    /// Whether the load has resolved, successfully or not.
    pub fn is_settled(&self) -> bool {
        !matches!(self, LoadProgress::Pending)
    }
}

/// Resolves a window's template, loading it first if needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefabLoader(Source);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Direct(Option<PrefabKey>),
    Deferred { key: AssetKey, state: LoadState },
}

impl PrefabLoader {
    pub fn for_source(source: &WindowSource) -> Self {
        match source {
            WindowSource::Prefab(key) => Self(Source::Direct(key.clone())),
            WindowSource::Deferred(key) => Self(Source::Deferred {
                key: key.clone(),
                state: LoadState::Idle,
            }),
        }
    }

    /// Whether this loader goes through the backend's asynchronous loads.
    pub fn is_async(&self) -> bool {
        matches!(self.0, Source::Deferred { .. })
    }

    /// Whether [`prefab`](Self::prefab) can be asked for a template now.
    pub fn is_loaded(&self) -> bool {
        match &self.0 {
            Source::Direct(_) => true,
            Source::Deferred { state, .. } => matches!(state, LoadState::Loaded(_)),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.0,
            Source::Deferred {
                state: LoadState::Loading,
                ..
            }
        )
    }

    /// Failure reason of the last load, if it failed.
    pub fn failure(&self) -> Option<&str> {
        match &self.0 {
            Source::Deferred {
                state: LoadState::Failed(reason),
                ..
            } => Some(reason),
            _ => None,
        }
    }

    /// Request the asset. Returns `true` if a new load was started; a loader
    /// that is already loading or loaded is left alone. A failed loader
    /// starts over.
    pub fn load(&mut self, backend: &mut dyn AssetBackend) -> bool {
        match &mut self.0 {
            Source::Direct(_) => false,
            Source::Deferred { key, state } => match state {
                LoadState::Idle | LoadState::Failed(_) => {
                    backend.request_load(key);
                    *state = LoadState::Loading;
                    true
                }
                LoadState::Loading | LoadState::Loaded(_) => false,
            },
        }
    }

    pub fn poll(&mut self, backend: &mut dyn AssetBackend) -> LoadProgress {
        let Source::Deferred { key, state } = &mut self.0 else {
            return LoadProgress::Loaded;
        };
        match state {
            LoadState::Idle => LoadProgress::Idle,
            LoadState::Loaded(_) => LoadProgress::Loaded,
            LoadState::Failed(_) => LoadProgress::Failed,
            LoadState::Loading => match backend.poll_load(key) {
                LoadStatus::Pending => LoadProgress::Pending,
                LoadStatus::Ready(prefab) => {
                    *state = LoadState::Loaded(prefab);
                    LoadProgress::JustLoaded
                }
                LoadStatus::Failed(reason) => {
                    *state = LoadState::Failed(reason.clone());
                    LoadProgress::JustFailed(reason)
                }
            },
        }
    }

    /// Release the asset. Returns `true` if the backend was asked to release
    /// something.
    pub fn unload(&mut self, backend: &mut dyn AssetBackend) -> bool {
        match &mut self.0 {
            Source::Direct(_) => false,
            Source::Deferred { key, state } => match state {
                LoadState::Loading | LoadState::Loaded(_) => {
                    backend.release(key);
                    *state = LoadState::Idle;
                    true
                }
                LoadState::Failed(_) => {
                    *state = LoadState::Idle;
                    false
                }
                LoadState::Idle => false,
            },
        }
    }

    /// The template to instantiate, once loaded.
    pub fn prefab(&self) -> Option<&PrefabKey> {
        match &self.0 {
            Source::Direct(key) => key.as_ref(),
            Source::Deferred {
                state: LoadState::Loaded(key),
                ..
            } => Some(key),
            Source::Deferred { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AssetError, WindowParts};
    use layerdeck_core::{LayerId, WindowId};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        statuses: VecDeque<LoadStatus>,
        requested: Vec<String>,
        released: Vec<String>,
    }

    impl AssetBackend for Scripted {
        fn instantiate(
            &mut self,
            _window: WindowId,
            _prefab: &PrefabKey,
            _layer: LayerId,
        ) -> Result<WindowParts, AssetError> {
            Err(AssetError::new("not used"))
        }

        fn request_load(&mut self, key: &AssetKey) {
            self.requested.push(key.to_string());
        }

        fn poll_load(&mut self, _key: &AssetKey) -> LoadStatus {
            self.statuses.pop_front().unwrap_or(LoadStatus::Pending)
        }

        fn release(&mut self, key: &AssetKey) {
            self.released.push(key.to_string());
        }
    }

    fn deferred() -> PrefabLoader {
        PrefabLoader::for_source(&WindowSource::Deferred(AssetKey::new("shop")))
    }

    #[test]
    fn direct_loader_is_always_loaded() {
        let loader = PrefabLoader::for_source(&WindowSource::Prefab(Some(PrefabKey::new("home"))));
        assert!(!loader.is_async());
        assert!(loader.is_loaded());
        assert_eq!(loader.prefab(), Some(&PrefabKey::new("home")));
    }

    #[test]
    fn direct_loader_without_template() {
        let loader = PrefabLoader::for_source(&WindowSource::Prefab(None));
        assert!(loader.is_loaded());
        assert_eq!(loader.prefab(), None);
    }

    #[test]
    fn deferred_load_reports_just_loaded_once() {
        let mut backend = Scripted::default();
        backend.statuses.push_back(LoadStatus::Pending);
        backend
            .statuses
            .push_back(LoadStatus::Ready(PrefabKey::new("shop.prefab")));

        let mut loader = deferred();
        assert_eq!(loader.poll(&mut backend), LoadProgress::Idle);
        assert!(loader.load(&mut backend));
        assert!(!loader.load(&mut backend));
        assert_eq!(backend.requested, vec!["shop"]);

        assert_eq!(loader.poll(&mut backend), LoadProgress::Pending);
        assert_eq!(loader.poll(&mut backend), LoadProgress::JustLoaded);
        assert_eq!(loader.poll(&mut backend), LoadProgress::Loaded);
        assert_eq!(loader.prefab(), Some(&PrefabKey::new("shop.prefab")));
    }

    #[test]
    fn failed_load_can_be_requested_again() {
        let mut backend = Scripted::default();
        backend.statuses.push_back(LoadStatus::Failed("404".into()));

        let mut loader = deferred();
        loader.load(&mut backend);
        assert_eq!(
            loader.poll(&mut backend),
            LoadProgress::JustFailed("404".into())
        );
        assert_eq!(loader.poll(&mut backend), LoadProgress::Failed);
        assert_eq!(loader.failure(), Some("404"));

        assert!(loader.load(&mut backend));
        assert!(loader.is_loading());
    }

    #[test]
    fn unload_releases_and_resets() {
        let mut backend = Scripted::default();
        backend
            .statuses
            .push_back(LoadStatus::Ready(PrefabKey::new("shop.prefab")));
        let mut loader = deferred();
        loader.load(&mut backend);
        loader.poll(&mut backend);

        assert!(loader.unload(&mut backend));
        assert_eq!(backend.released, vec!["shop"]);
        assert!(!loader.is_loaded());
        assert!(!loader.unload(&mut backend));
    }
}
