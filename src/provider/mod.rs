//! Mapping provider backends
//!
//! [`headless`] keeps an in-memory scene of everything drawn, [`html`]
//! writes a standalone page that drives the real JavaScript library.

pub mod headless;
pub mod html;

use crate::{
    constants::POLYLINE_PRECISION,
    core::geo::{LatLng, LatLngBounds},
    MapError, Result,
};
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// Handle of a map created by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MapId(pub u32);

/// Handle of a polyline, marker or info window created by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OverlayId(pub u32);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map{}", self.0)
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// DOM id of the hosting element
    pub container_id: String,
    pub map_id: String,
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
}

impl MapOptions {
    pub fn new(container_id: impl Into<String>, map_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            map_id: map_id.into(),
            center: None,
            zoom: None,
        }
    }

    /// Constructor options in the provider's JSON shape
    pub fn to_json(&self) -> serde_json::Value {
        let mut options = json!({ "mapId": self.map_id });
        if let Some(center) = self.center {
            options["center"] = json!({ "lat": center.lat, "lng": center.lng });
        }
        if let Some(zoom) = self.zoom {
            options["zoom"] = json!(zoom);
        }
        options
    }
}

/// Bounds literal in the provider's `{south, west, north, east}` shape
pub fn bounds_literal(bounds: &LatLngBounds) -> serde_json::Value {
    json!({
        "south": bounds.south_west.lat,
        "west": bounds.south_west.lng,
        "north": bounds.north_east.lat,
        "east": bounds.north_east.lng,
    })
}

/// Decode an encoded polyline at the provider's precision
pub fn decode_path(encoded: &str) -> Result<Vec<LatLng>> {
    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION)
        .map_err(|e| MapError::Decode(e.to_string()))?;
    Ok(line.0.into_iter().map(LatLng::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reference_path() {
        let path = decode_path("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(path.len(), 3);
        assert!((path[0].lat - 38.5).abs() < 1e-9);
        assert!((path[0].lng + 120.2).abs() < 1e-9);
        assert!((path[2].lat - 43.252).abs() < 1e-9);
        assert!((path[2].lng + 126.453).abs() < 1e-9);
    }

    #[test]
    fn test_map_options_json() {
        let options = MapOptions::new("map", "DEMO_MAP_ID").to_json();
        assert_eq!(options, json!({ "mapId": "DEMO_MAP_ID" }));
    }
}
