//! Memoized loading of the provider library
//!
//! A [`LibraryLoader`] issues at most one script request for its lifetime.
//! The request is dispatched lazily when the shared load future is first
//! polled, so every library asked for before then is merged into it. Libraries
//! asked for afterwards are imported on the resolved provider.
//!
//! A failed load stays failed: later callers get the same [`LoadError`].

use super::{host::ScriptElement, query, Library};
use crate::{
    core::config::LoaderConfig,
    traits::{MapsProvider, ScriptHost},
    LoadError, Result,
};
use futures::future::{BoxFuture, FutureExt, Shared};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type LoadOutput = std::result::Result<Arc<dyn MapsProvider>, LoadError>;
type SharedLoad = Shared<BoxFuture<'static, LoadOutput>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    /// Nothing requested yet
    Idle,
    /// Script requested, callback not yet fired
    Pending,
    Loaded,
    Failed,
}

struct LoaderState {
    /// Every library asked for, in first-request order
    requested: Vec<Library>,
    /// Libraries included in the script URL, set at dispatch
    dispatched: Option<Vec<Library>>,
    load: Option<SharedLoad>,
    status: LoaderStatus,
}

struct LoaderInner {
    config: LoaderConfig,
    host: Arc<dyn ScriptHost>,
    state: Mutex<LoaderState>,
}

impl LoaderInner {
    fn state(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a single memoized library load. Clones share the same load.
#[derive(Clone)]
pub struct LibraryLoader {
    inner: Arc<LoaderInner>,
}

impl std::fmt::Debug for LibraryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryLoader")
            .field("config", &redacted(&self.inner.config))
            .field("status", &self.status())
            .finish()
    }
}

impl LibraryLoader {
    pub fn new(config: LoaderConfig, host: Arc<dyn ScriptHost>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                config,
                host,
                state: Mutex::new(LoaderState {
                    requested: Vec::new(),
                    dispatched: None,
                    load: None,
                    status: LoaderStatus::Idle,
                }),
            }),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    pub fn status(&self) -> LoaderStatus {
        self.inner.state().status
    }

    /// Every library requested so far, in first-request order
    pub fn requested_libraries(&self) -> Vec<Library> {
        self.inner.state().requested.clone()
    }

    /// Request `libraries` and resolve with the provider once they are all
    /// available.
    ///
    /// The libraries are registered when this is called, not when the
    /// returned future is first polled.
    pub fn load(
        &self,
        libraries: &[Library],
    ) -> impl Future<Output = Result<Arc<dyn MapsProvider>>> + Send + 'static {
        let shared = {
            let mut state = self.inner.state();
            for library in libraries {
                if !state.requested.contains(library) {
                    state.requested.push(library.clone());
                }
            }
            if state.status == LoaderStatus::Idle {
                state.status = LoaderStatus::Pending;
            }
            let weak = Arc::downgrade(&self.inner);
            state
                .load
                .get_or_insert_with(|| dispatch(weak).boxed().shared())
                .clone()
        };

        let inner = Arc::clone(&self.inner);
        let wanted = libraries.to_vec();
        async move {
            let provider = shared.await?;
            let late: Vec<Library> = {
                let state = inner.state();
                let dispatched = state.dispatched.as_deref().unwrap_or(&[]);
                wanted
                    .into_iter()
                    .filter(|library| !dispatched.contains(library))
                    .collect()
            };
            for library in &late {
                if !provider.has_library(library) {
                    log::debug!("importing {} after load", library);
                    provider.import_library(library).await?;
                }
            }
            Ok(provider)
        }
    }
}

async fn dispatch(inner: Weak<LoaderInner>) -> LoadOutput {
    let inner = inner.upgrade().ok_or(LoadError::Abandoned)?;
    let config = &inner.config;

    let libraries = {
        let mut state = inner.state();
        state.dispatched = Some(state.requested.clone());
        state.requested.clone()
    };

    let element = match query::script_url(config, &libraries) {
        Ok(src) => ScriptElement::new(src, config.callback.clone())
            .with_nonce(inner.host.existing_nonce()),
        Err(e) => {
            inner.state().status = LoaderStatus::Failed;
            log::error!("invalid script URL {}: {}", config.endpoint, e);
            return Err(LoadError::ScriptLoad {
                url: config.endpoint.clone(),
                reason: e.to_string(),
            });
        }
    };
    let shown = query::redact_key(&element.src);
    log::debug!("injecting provider script {}", shown);

    match inner.host.inject(element).await {
        Ok(provider) => {
            inner.state().status = LoaderStatus::Loaded;
            log::info!("provider library loaded with [{}]", join(&libraries));
            Ok(provider)
        }
        Err(e) => {
            inner.state().status = LoaderStatus::Failed;
            log::error!("provider script {} failed to load: {}", shown, e);
            Err(LoadError::ScriptLoad {
                url: shown,
                reason: e.to_string(),
            })
        }
    }
}

fn join(libraries: &[Library]) -> String {
    libraries
        .iter()
        .map(Library::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn redacted(config: &LoaderConfig) -> LoaderConfig {
    let mut shown = config.clone();
    if shown.key.is_some() {
        shown.key = Some("***".into());
    }
    shown
}

/// Holds the one loader of an application.
///
/// The first install wins; later installs log a warning and get the existing
/// loader back with their configuration ignored.
#[derive(Default)]
pub struct LoaderSlot {
    cell: OnceCell<LibraryLoader>,
}

impl LoaderSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn install(&self, config: LoaderConfig, host: Arc<dyn ScriptHost>) -> LibraryLoader {
        let requested = format!("{:?}", redacted(&config));
        let mut installed = false;
        let loader = self.cell.get_or_init(|| {
            installed = true;
            LibraryLoader::new(config, host)
        });
        if !installed {
            log::warn!(
                "The mapping library only loads once. Ignoring: {}",
                requested
            );
        }
        loader.clone()
    }

    pub fn get(&self) -> Option<&LibraryLoader> {
        self.cell.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::headless::HeadlessHost;

    fn loader(host: &Arc<HeadlessHost>) -> LibraryLoader {
        let host: Arc<dyn ScriptHost> = host.clone();
        LibraryLoader::new(LoaderConfig::default().with_key("k"), host)
    }

    #[tokio::test]
    async fn test_requests_merge_before_dispatch() {
        let host = Arc::new(HeadlessHost::new());
        let loader = loader(&host);
        assert_eq!(loader.status(), LoaderStatus::Idle);

        let maps = loader.load(&[Library::Maps]);
        let marker = loader.load(&[Library::Marker, Library::Maps]);
        assert_eq!(loader.status(), LoaderStatus::Pending);
        assert_eq!(host.injection_count(), 0);

        let (a, b) = futures::join!(maps, marker);
        assert!(a.is_ok() && b.is_ok());

        let injected = host.injected();
        assert_eq!(injected.len(), 1);
        assert_eq!(injected[0].libraries(), vec![Library::Maps, Library::Marker]);
        assert_eq!(loader.status(), LoaderStatus::Loaded);
    }

    #[tokio::test]
    async fn test_late_library_is_imported() {
        let host = Arc::new(HeadlessHost::new());
        let loader = loader(&host);

        loader.load(&[Library::Maps]).await.unwrap();
        let provider = loader.load(&[Library::Geometry]).await.unwrap();

        assert_eq!(host.injection_count(), 1);
        assert!(provider.has_library(&Library::Geometry));
        assert_eq!(
            loader.requested_libraries(),
            vec![Library::Maps, Library::Geometry]
        );
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_not_retried() {
        let host = Arc::new(HeadlessHost::failing("blocked"));
        let loader = loader(&host);

        let first = loader.load(&[Library::Maps]).await.unwrap_err();
        let second = loader.load(&[Library::Marker]).await.unwrap_err();

        assert_eq!(first.to_string(), "The mapping library could not load.");
        assert_eq!(second.to_string(), first.to_string());
        assert_eq!(host.injection_count(), 1);
        assert_eq!(loader.status(), LoaderStatus::Failed);
    }

    #[tokio::test]
    async fn test_nonce_is_copied() {
        let host = Arc::new(HeadlessHost::new().with_nonce("n0nce"));
        let loader = loader(&host);
        loader.load(&[]).await.unwrap();
        assert_eq!(host.injected()[0].nonce.as_deref(), Some("n0nce"));
    }

    #[test]
    fn test_slot_keeps_first_loader() {
        let slot = LoaderSlot::new();
        let host: Arc<dyn ScriptHost> = Arc::new(HeadlessHost::new());

        let first = slot.install(LoaderConfig::default().with_key("one"), host.clone());
        let second = slot.install(LoaderConfig::default().with_key("two"), host);

        assert_eq!(first.config().key.as_deref(), Some("one"));
        assert_eq!(second.config().key.as_deref(), Some("one"));
        assert!(slot.get().is_some());
    }

    #[test]
    fn test_debug_hides_key() {
        let host: Arc<dyn ScriptHost> = Arc::new(HeadlessHost::new());
        let loader = LibraryLoader::new(LoaderConfig::default().with_key("secret"), host);
        assert!(!format!("{:?}", loader).contains("secret"));
    }
}
