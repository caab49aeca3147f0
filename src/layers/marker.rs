use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
};
use serde::{Deserialize, Serialize};

/// Which provider constructor builds a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// `marker.AdvancedMarkerElement`, needs a map id
    Advanced,
    /// The legacy `Marker` class
    Classic,
}

impl MarkerKind {
    /// Library that provides the constructor
    pub fn library(&self) -> &'static str {
        match self {
            MarkerKind::Advanced => "marker",
            MarkerKind::Classic => "maps",
        }
    }

    pub fn constructor(&self) -> &'static str {
        match self {
            MarkerKind::Advanced => "AdvancedMarkerElement",
            MarkerKind::Classic => "Marker",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    properties: LayerProperties,
    position: LatLng,
    title: String,
    kind: MarkerKind,
}

impl Marker {
    pub fn new(id: String, position: LatLng, kind: MarkerKind) -> Self {
        let properties = LayerProperties::new(id, "Marker".to_string(), LayerType::Marker);
        Self {
            properties,
            position,
            title: String::new(),
            kind,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> MarkerKind {
        self.kind
    }
}

impl LayerTrait for Marker {
    crate::impl_layer_trait!(Marker, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "position": {
                "lat": self.position.lat,
                "lng": self.position.lng
            },
            "title": self.title,
            "zIndex": self.properties.z_index
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(LatLngBounds::new(self.position, self.position))
    }
}
