// Overlay is the shared trait for everything drawn on the map
pub use crate::traits::Overlay as LayerTrait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Polyline,
    Marker,
    InfoWindow,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Polyline => write!(f, "polyline"),
            LayerType::Marker => write!(f, "marker"),
            LayerType::InfoWindow => write!(f, "info_window"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub z_index: i32,
    pub visible: bool,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType) -> Self {
        Self {
            id,
            name,
            layer_type,
            z_index: 0,
            visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_properties() {
        let props = LayerProperties::new(
            "route".to_string(),
            "Route".to_string(),
            LayerType::Polyline,
        );

        assert_eq!(props.id, "route");
        assert_eq!(props.name, "Route");
        assert_eq!(props.layer_type, LayerType::Polyline);
        assert_eq!(props.z_index, 0);
        assert!(props.visible);
    }

    #[test]
    fn test_layer_type_display() {
        assert_eq!(LayerType::Polyline.to_string(), "polyline");
        assert_eq!(LayerType::Marker.to_string(), "marker");
        assert_eq!(LayerType::InfoWindow.to_string(), "info_window");
    }
}
