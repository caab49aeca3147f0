//! Core constants for the mapping provider protocol and the route styling.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Script endpoint of the mapping JavaScript API.
pub const DEFAULT_SCRIPT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/js";

/// API release channel requested when none is configured.
pub const DEFAULT_API_VERSION: &str = "weekly";

/// Name of the callback the provider script invokes once it has loaded.
pub const DEFAULT_CALLBACK: &str = "initMap";

/// DOM id of the element hosting the map.
pub const DEFAULT_CONTAINER_ID: &str = "map";

/// Map style identifier passed to the map constructor.
pub const DEFAULT_MAP_ID: &str = "DEMO_MAP_ID";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MAPS_API_KEY";

/// Precision of the provider's polyline encoding (1e5).
pub const POLYLINE_PRECISION: u32 = 5;

/// Square tile size in pixels used for viewport projection.
pub const TILE_SIZE: u32 = 256;

/// Highest zoom level the viewport will fit to.
pub const DEFAULT_MAX_ZOOM: f64 = 18.0;

/// Padding in pixels kept around fitted bounds.
pub const DEFAULT_FIT_PADDING: f64 = 20.0;

/// Wide pale line drawn underneath the route.
pub const HALO_STROKE_COLOR: &str = "#a8c7fa";
pub const HALO_STROKE_WEIGHT: f32 = 10.0;

/// Narrow saturated line drawn on top of the halo.
pub const ROUTE_STROKE_COLOR: &str = "#1a73e8";
pub const ROUTE_STROKE_WEIGHT: f32 = 5.0;

/// Placeholder shown for station fields the backend could not provide.
pub const NOT_AVAILABLE: &str = "not available";
