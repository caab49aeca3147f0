use crate::{
    core::config::RouteMapConfig,
    credentials::CredentialSource,
    data::trip::TripSummary,
    initializer::{MapInitializer, RenderedRoute},
    loader::{
        bootstrap::{LibraryLoader, LoaderSlot},
        Library,
    },
    traits::{MapsProvider, ScriptHost},
    Result,
};
use std::sync::Arc;

/// A route map view: resolves the API key, loads the provider library once,
/// then draws trips on it.
///
/// The key is read on the first load, not at construction.
pub struct RouteMap {
    config: RouteMapConfig,
    credentials: Box<dyn CredentialSource>,
    host: Arc<dyn ScriptHost>,
    slot: LoaderSlot,
}

impl RouteMap {
    pub fn new(
        config: RouteMapConfig,
        credentials: impl CredentialSource + 'static,
        host: Arc<dyn ScriptHost>,
    ) -> Self {
        Self {
            config,
            credentials: Box::new(credentials),
            host,
            slot: LoaderSlot::new(),
        }
    }

    pub fn config(&self) -> &RouteMapConfig {
        &self.config
    }

    /// The loader of this map, created with the resolved key on first use
    pub fn loader(&self) -> Result<LibraryLoader> {
        if let Some(loader) = self.slot.get() {
            return Ok(loader.clone());
        }

        let key = self.credentials.api_key()?;
        let config = self.config.loader.clone().with_key(key);
        config.validate()?;
        Ok(self.slot.install(config, Arc::clone(&self.host)))
    }

    /// Load the provider with every library the route map draws with
    pub async fn provider(&self) -> Result<Arc<dyn MapsProvider>> {
        self.loader()?.load(&Library::route_map()).await
    }

    /// Draw `trip`. Invalid data fails before the library is requested.
    pub async fn render(&self, trip: &TripSummary) -> Result<RenderedRoute> {
        trip.validate()?;
        let provider = self.provider().await?;
        MapInitializer::new(self.config.view.clone())
            .initialize(provider.as_ref(), trip)
            .await
    }
}

impl std::fmt::Debug for RouteMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMap")
            .field("view", &self.config.view)
            .field("loader", &self.slot.get())
            .finish()
    }
}
