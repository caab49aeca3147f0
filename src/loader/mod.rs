//! Loading the provider's JavaScript library
//!
//! [`bootstrap::LibraryLoader`] owns the single script request, [`query`]
//! turns the loader configuration into its URL and [`host`] defines the
//! element handed to a [`ScriptHost`](crate::traits::ScriptHost).

pub mod bootstrap;
pub mod host;
pub mod query;

use std::fmt;

/// A sub-library of the provider that can be requested on load or imported
/// later
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Library {
    /// Geometry primitives (`LatLng`, `LatLngBounds`)
    Core,
    /// `Map`, `Polyline`, `InfoWindow` and the classic `Marker`
    Maps,
    /// Spherical helpers and the polyline `encoding` namespace
    Geometry,
    /// `AdvancedMarkerElement`
    Marker,
    Places,
    Routes,
    Other(String),
}

impl Library {
    pub fn as_str(&self) -> &str {
        match self {
            Library::Core => "core",
            Library::Maps => "maps",
            Library::Geometry => "geometry",
            Library::Marker => "marker",
            Library::Places => "places",
            Library::Routes => "routes",
            Library::Other(name) => name,
        }
    }

    /// Capability groups the route map needs before drawing
    pub fn route_map() -> [Library; 4] {
        [Library::Core, Library::Maps, Library::Geometry, Library::Marker]
    }
}

impl From<&str> for Library {
    fn from(name: &str) -> Self {
        match name {
            "core" => Library::Core,
            "maps" => Library::Maps,
            "geometry" => Library::Geometry,
            "marker" => Library::Marker,
            "places" => Library::Places,
            "routes" => Library::Routes,
            other => Library::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
