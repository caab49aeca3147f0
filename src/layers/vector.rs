use crate::{
    constants::{HALO_STROKE_COLOR, HALO_STROKE_WEIGHT, ROUTE_STROKE_COLOR, ROUTE_STROKE_WEIGHT},
    core::geo::{LatLng, LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
    MapError,
};
use serde::{Deserialize, Serialize};

/// RGB color that serializes as a CSS hex string (`#rrggbb`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl SerializableColor {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb`
    pub fn from_hex(hex: &str) -> Result<Self, MapError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || MapError::Config(format!("invalid color: {hex}"));
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        if !digits.is_ascii() {
            return Err(invalid());
        }

        match digits.len() {
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = MapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

/// Stroke of a route line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: SerializableColor,
    /// Stroke weight in pixels
    pub width: f32,
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
}

impl LineStyle {
    /// The wide pale line behind the route
    pub fn halo() -> Self {
        Self {
            color: hex_constant(HALO_STROKE_COLOR),
            width: HALO_STROKE_WEIGHT,
            opacity: 1.0,
        }
    }

    /// The narrow saturated line on top of the halo
    pub fn route() -> Self {
        Self {
            color: hex_constant(ROUTE_STROKE_COLOR),
            width: ROUTE_STROKE_WEIGHT,
            opacity: 1.0,
        }
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::route()
    }
}

fn hex_constant(hex: &str) -> SerializableColor {
    SerializableColor::from_hex(hex).unwrap_or(SerializableColor::rgb(0, 0, 255))
}

/// A styled path drawn on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    properties: LayerProperties,
    path: Vec<LatLng>,
    style: LineStyle,
}

impl Polyline {
    pub fn new(id: String, path: Vec<LatLng>, style: LineStyle) -> Self {
        let properties = LayerProperties::new(id, "Polyline".to_string(), LayerType::Polyline);
        Self {
            properties,
            path,
            style,
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.properties.z_index = z_index;
        self
    }

    pub fn path(&self) -> &[LatLng] {
        &self.path
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }

    /// Path length in meters
    pub fn length(&self) -> f64 {
        self.path
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }
}

impl LayerTrait for Polyline {
    crate::impl_layer_trait!(Polyline, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "path": self.path,
            "strokeColor": self.style.color.to_hex(),
            "strokeOpacity": self.style.opacity,
            "strokeWeight": self.style.width,
            "zIndex": self.properties.z_index
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.path)
    }
}
