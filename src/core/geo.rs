use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web Mercator projection constants
const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.0511287798;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Calculates the distance in meters to another LatLng using the Haversine formula
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Converts to Web Mercator projection (EPSG:3857)
    pub fn to_mercator(&self) -> Point {
        let lat = Self::clamp_lat(self.lat);
        let x = self.lng.to_radians() * EARTH_RADIUS;
        let y = ((PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;
        Point::new(x, y)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<geo_types::Coord<f64>> for LatLng {
    /// geo-types stores coordinates as (x = longitude, y = latitude)
    fn from(coord: geo_types::Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
///
/// Serialized with the `southwest` / `northeast` keys used by trip summaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    #[serde(rename = "southwest", alias = "south_west")]
    pub south_west: LatLng,
    #[serde(rename = "northeast", alias = "north_east")]
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Smallest bounds containing every point, `None` for an empty slice
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for point in rest {
            bounds.extend(point);
        }
        Some(bounds)
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(43.6532, -79.3832);
        assert_eq!(coord.lat, 43.6532);
        assert_eq!(coord.lng, -79.3832);
        assert!(coord.is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_lat_lng_distance() {
        let toronto = LatLng::new(43.6532, -79.3832);
        let montreal = LatLng::new(45.5019, -73.5674);
        let distance = toronto.distance_to(&montreal);

        // Roughly 504 km as the crow flies
        assert!((distance - 504_000.0).abs() < 10_000.0);
    }

    #[test]
    fn test_geo_types_axis_order() {
        let coord = geo_types::Coord { x: -120.2, y: 38.5 };
        let lat_lng = LatLng::from(coord);
        assert_eq!(lat_lng, LatLng::new(38.5, -120.2));
    }

    #[test]
    fn test_bounds_from_points() {
        let points = [
            LatLng::new(1.0, 4.0),
            LatLng::new(3.0, 2.0),
            LatLng::new(2.0, 3.0),
        ];
        let bounds = LatLngBounds::from_points(&points).unwrap();
        assert_eq!(bounds, LatLngBounds::from_coords(1.0, 2.0, 3.0, 4.0));
        assert!(bounds.contains(&LatLng::new(2.0, 3.0)));
        assert!(LatLngBounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_serde_keys() {
        let json = r#"{"southwest":{"lat":1,"lng":2},"northeast":{"lat":3,"lng":4}}"#;
        let bounds: LatLngBounds = serde_json::from_str(json).unwrap();
        assert_eq!(bounds.south_west, LatLng::new(1.0, 2.0));
        assert_eq!(bounds.north_east, LatLng::new(3.0, 4.0));
        assert_eq!(bounds.center(), LatLng::new(2.0, 3.0));
    }
}
