//! Configuration for the library loader and the rendered map view
//!
//! Both halves deserialize from a single JSON document (see
//! [`RouteMapConfig::from_file`]). [`RouteMap`](crate::RouteMap) resolves the
//! API key at runtime through a
//! [`CredentialSource`](crate::credentials::CredentialSource), replacing any
//! `key` found in the file.

use crate::constants::{
    DEFAULT_API_VERSION, DEFAULT_CALLBACK, DEFAULT_CONTAINER_ID, DEFAULT_FIT_PADDING,
    DEFAULT_MAP_ID, DEFAULT_SCRIPT_ENDPOINT,
};
use crate::core::geo::Point;
use crate::layers::{marker::MarkerKind, vector::LineStyle};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Namespaced configuration forwarded to the provider script as query
/// parameters. Field names serialize in camelCase; the loader rewrites them
/// to snake_case on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default = "default_version")]
    pub v: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_referrer_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub map_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_channel: Option<String>,

    /// Script endpoint, not forwarded as a parameter
    #[serde(default = "default_endpoint", skip_serializing)]
    pub endpoint: String,

    /// Callback the script invokes on load, sent as the `callback` parameter
    #[serde(default = "default_callback", skip_serializing)]
    pub callback: String,

    /// Any further provider parameters, forwarded verbatim after key rewriting
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_SCRIPT_ENDPOINT.to_string()
}

fn default_callback() -> String {
    DEFAULT_CALLBACK.to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            key: None,
            v: default_version(),
            language: None,
            region: None,
            auth_referrer_policy: None,
            map_ids: Vec::new(),
            channel: None,
            solution_channel: None,
            endpoint: default_endpoint(),
            callback: default_callback(),
            extra: BTreeMap::new(),
        }
    }
}

impl LoaderConfig {
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.v.trim().is_empty() {
            return Err(MapError::Config("loader version must not be empty".into()));
        }
        if self.callback.trim().is_empty() {
            return Err(MapError::Config("loader callback must not be empty".into()));
        }
        url::Url::parse(&self.endpoint)?;
        Ok(())
    }
}

/// How the route map is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    /// DOM id of the element hosting the map
    pub container_id: String,
    /// Provider style identifier
    pub map_id: String,
    /// Viewport size in pixels, used to compute the fitted zoom
    pub size: Point,
    pub fit_padding: f64,
    /// Wide line drawn underneath the route
    pub halo: LineStyle,
    /// Narrow line drawn on top
    pub route: LineStyle,
    pub leg_marker: MarkerKind,
    pub destination_marker: MarkerKind,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            map_id: DEFAULT_MAP_ID.to_string(),
            size: Point::new(1200.0, 800.0),
            fit_padding: DEFAULT_FIT_PADDING,
            halo: LineStyle::halo(),
            route: LineStyle::route(),
            leg_marker: MarkerKind::Advanced,
            destination_marker: MarkerKind::Classic,
        }
    }
}

/// Element ids usable both in `getElementById` and as a bare `#id` selector:
/// an ASCII letter followed by letters, digits, `-` or `_`
pub fn is_valid_container_id(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next().map_or(false, |c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl MapViewConfig {
    pub fn validate(&self) -> Result<()> {
        if self.container_id.trim().is_empty() {
            return Err(MapError::Config("container id must not be empty".into()));
        }
        if !is_valid_container_id(&self.container_id) {
            return Err(MapError::Config(format!(
                "invalid container id: {:?}",
                self.container_id
            )));
        }
        if !(self.size.x > 0.0 && self.size.y > 0.0) {
            return Err(MapError::Config(format!(
                "viewport size must be positive, got {}x{}",
                self.size.x, self.size.y
            )));
        }
        if self.fit_padding < 0.0 {
            return Err(MapError::Config("fit padding must not be negative".into()));
        }
        for (name, style) in [("halo", &self.halo), ("route", &self.route)] {
            if style.width <= 0.0 {
                return Err(MapError::Config(format!("{name} stroke width must be positive")));
            }
        }
        Ok(())
    }
}

/// Complete configuration of a route map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteMapConfig {
    pub loader: LoaderConfig,
    pub view: MapViewConfig,
}

impl RouteMapConfig {
    /// Reads a JSON configuration file; absent sections fall back to defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.loader.validate()?;
        self.view.validate()
    }
}
