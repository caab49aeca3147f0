//! # routemap
//!
//! Route map view for electric-vehicle trips.
//!
//! The crate loads a third-party mapping library through a memoized loader,
//! fits the viewport to a trip's bounding box, draws the route polyline and
//! places clickable charge station markers. The mapping provider sits behind
//! the [`MapsProvider`] trait so the same initializer drives an in-memory
//! scene, a generated HTML page, or any other backend.

pub mod core;
pub mod credentials;
pub mod data;
pub mod initializer;
pub mod layers;
pub mod loader;
pub mod prelude;
pub mod provider;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{LoaderConfig, MapViewConfig, RouteMapConfig},
    geo::{LatLng, LatLngBounds},
    map::RouteMap,
    viewport::Viewport,
};

pub use credentials::{CharCodeKey, CredentialSource, EnvCredentials, StaticKey};

pub use data::trip::{ChargeStation, DestinationSummary, LegSummary, TripSummary};

pub use initializer::{MapInitializer, RenderedRoute, StationOverlay};

pub use layers::{marker::Marker, vector::Polyline};

pub use loader::{
    bootstrap::{LibraryLoader, LoaderSlot, LoaderStatus},
    host::ScriptElement,
    Library,
};

pub use provider::{headless::HeadlessProvider, html::HtmlProvider, MapId, OverlayId};

pub use traits::{MapsProvider, ScriptHost};

pub use ui::popup::Popup;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Failure of the shared library load.
///
/// Cloneable so that every caller awaiting the same load observes the same
/// error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("The mapping library could not load.")]
    ScriptLoad { url: String, reason: String },

    #[error("Library loader was dropped before the load completed")]
    Abandoned,
}

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "http")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid trip data: {0}")]
    InvalidData(String),

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Library not loaded: {0}")]
    LibraryNotLoaded(String),

    #[error("Polyline decode error: {0}")]
    Decode(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapError;
