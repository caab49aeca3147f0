//! Shared trait abstractions
//!
//! These are the seams between the crate and the outside world: the script
//! host that fetches the provider library, the resolved provider itself, and
//! the overlays drawn through it.

use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::{base::LayerType, marker::Marker, vector::Polyline},
    loader::{host::ScriptElement, Library},
    provider::{MapId, MapOptions, OverlayId},
    ui::popup::Popup,
    Result,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for objects drawn on a map
pub trait Overlay: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn layer_type(&self) -> LayerType;

    fn z_index(&self) -> i32;

    fn set_z_index(&mut self, z_index: i32);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Geographic extent, if the overlay has one
    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }

    /// Constructor options in the provider's JSON shape
    fn options(&self) -> serde_json::Value;
}

/// Where the provider script gets injected.
///
/// In a browser this is the document head; elsewhere it may be a page being
/// generated, a test double or an HTTP client.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Nonce of an already present script element, copied onto the injected
    /// one for content-security-policy compatibility
    fn existing_nonce(&self) -> Option<String> {
        None
    }

    /// Inject `script` and resolve once the provider's callback has fired.
    /// Errors mean the script could not be fetched or executed.
    async fn inject(&self, script: ScriptElement) -> Result<Arc<dyn MapsProvider>>;
}

/// Capability handle of a loaded mapping library.
///
/// Every constructor call requires the library that provides it to have been
/// imported first.
#[async_trait]
pub trait MapsProvider: Send + Sync {
    /// Make a sub-library available
    async fn import_library(&self, library: &Library) -> Result<()>;

    /// Whether `library` has been imported
    fn has_library(&self, library: &Library) -> bool;

    fn create_map(&self, options: &MapOptions) -> Result<MapId>;

    fn fit_bounds(&self, map: MapId, bounds: &LatLngBounds) -> Result<()>;

    /// Decode a path in the provider's polyline encoding
    fn decode_path(&self, encoded: &str) -> Result<Vec<LatLng>>;

    fn add_polyline(&self, map: MapId, polyline: &Polyline) -> Result<OverlayId>;

    fn add_marker(&self, map: MapId, marker: &Marker) -> Result<OverlayId>;

    /// Create a closed info window
    fn create_info_window(&self, popup: &Popup) -> Result<OverlayId>;

    /// Open `info_window`, anchored at `marker`, whenever `marker` is clicked
    fn open_on_click(&self, map: MapId, marker: OverlayId, info_window: OverlayId) -> Result<()>;
}

impl std::fmt::Debug for dyn MapsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsProvider").finish_non_exhaustive()
    }
}
