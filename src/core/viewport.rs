use crate::constants::{DEFAULT_FIT_PADDING, DEFAULT_MAX_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const EARTH_RADIUS: f64 = 6378137.0;

/// The current view of the map: center, zoom, screen size and the bounds it
/// was last fitted to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
    /// Bounds passed to the last `fit_bounds`, kept exactly as given
    fitted: Option<LatLngBounds>,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, DEFAULT_MAX_ZOOM),
            size,
            min_zoom: 0.0,
            max_zoom: DEFAULT_MAX_ZOOM,
            fitted: None,
        }
    }

    /// Creates a viewport of the given pixel size fitted to `bounds`
    pub fn from_bounds(bounds: &LatLngBounds, size: Point, padding: f64) -> Self {
        let mut viewport = Self::new(bounds.center(), 0.0, size);
        viewport.fit_bounds(bounds, Some(padding));
        viewport
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        let scale = TILE_SIZE as f64 * 2_f64.powf(z);
        let mercator = lat_lng.to_mercator();

        let world = 2.0 * PI * EARTH_RADIUS;
        let pixel_x = (mercator.x + PI * EARTH_RADIUS) / world * scale;
        let pixel_y = (-mercator.y + PI * EARTH_RADIUS) / world * scale;

        Point::new(pixel_x, pixel_y)
    }

    /// Fits the viewport to contain the given bounds.
    ///
    /// The center moves to the middle of the bounds and the zoom becomes the
    /// highest integer level at which the bounds still fit inside the padded
    /// viewport.
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: Option<f64>) {
        let padding = padding.unwrap_or(DEFAULT_FIT_PADDING);
        self.center = bounds.center();

        let available = Point::new(
            (self.size.x - 2.0 * padding).max(1.0),
            (self.size.y - 2.0 * padding).max(1.0),
        );

        let mut best_zoom = self.min_zoom;
        for test_zoom in (self.min_zoom as i32)..=(self.max_zoom as i32) {
            let zoom = test_zoom as f64;

            let nw = self.project(
                &LatLng::new(bounds.north_east.lat, bounds.south_west.lng),
                Some(zoom),
            );
            let se = self.project(
                &LatLng::new(bounds.south_west.lat, bounds.north_east.lng),
                Some(zoom),
            );

            let width = (se.x - nw.x).abs();
            let height = (se.y - nw.y).abs();

            if width <= available.x && height <= available.y {
                best_zoom = zoom;
            } else {
                break;
            }
        }

        log::debug!(
            "fit bounds SW({:.6}, {:.6}) NE({:.6}, {:.6}) -> zoom {}",
            bounds.south_west.lat,
            bounds.south_west.lng,
            bounds.north_east.lat,
            bounds.north_east.lng,
            best_zoom
        );

        self.set_zoom(best_zoom);
        self.fitted = Some(*bounds);
    }

    /// The bounds this viewport was last fitted to
    pub fn fitted_bounds(&self) -> Option<&LatLngBounds> {
        self.fitted.as_ref()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(
            LatLng::new(43.6532, -79.3832),
            10.0,
            Point::new(800.0, 600.0),
        );

        assert_eq!(viewport.zoom, 10.0);
        assert_eq!(viewport.center.lat, 43.6532);
        assert_eq!(viewport.size.x, 800.0);
        assert!(viewport.fitted_bounds().is_none());
    }

    #[test]
    fn test_project_world_center() {
        let viewport = Viewport::default();
        let pixel = viewport.project(&LatLng::new(0.0, 0.0), Some(1.0));
        assert!((pixel.x - 256.0).abs() < 1e-6);
        assert!((pixel.y - 256.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0);
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_fit_bounds_keeps_literal_corners() {
        let bounds = LatLngBounds::from_coords(1.0, 2.0, 3.0, 4.0);
        let viewport = Viewport::from_bounds(&bounds, Point::new(800.0, 600.0), 20.0);

        let fitted = viewport.fitted_bounds().unwrap();
        assert_eq!(fitted.south_west, LatLng::new(1.0, 2.0));
        assert_eq!(fitted.north_east, LatLng::new(3.0, 4.0));
        assert_eq!(viewport.center, LatLng::new(2.0, 3.0));
        // Two degrees span about 364px at zoom 8 and 728px at zoom 9
        assert_eq!(viewport.zoom, 8.0);
    }

    #[test]
    fn test_fit_single_point_zooms_to_max() {
        let point = LatLng::new(45.0, -75.0);
        let bounds = LatLngBounds::new(point, point);
        let viewport = Viewport::from_bounds(&bounds, Point::new(800.0, 600.0), 20.0);
        assert_eq!(viewport.zoom, viewport.max_zoom);
    }
}
