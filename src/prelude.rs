//! Prelude module for common routemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use routemap::prelude::*;`

pub use crate::core::{
    config::{LoaderConfig, MapViewConfig, RouteMapConfig},
    geo::{LatLng, LatLngBounds, Point},
    map::RouteMap,
    viewport::Viewport,
};

pub use crate::credentials::{CharCodeKey, CredentialSource, EnvCredentials, StaticKey};

pub use crate::data::trip::{ChargeStation, DestinationSummary, LegSummary, TripSummary};

pub use crate::initializer::{MapInitializer, RenderedRoute, StationOverlay};

pub use crate::layers::{
    base::{LayerTrait, LayerType},
    marker::{Marker, MarkerKind},
    vector::{LineStyle, Polyline, SerializableColor},
};

pub use crate::loader::{
    bootstrap::{LibraryLoader, LoaderSlot, LoaderStatus},
    host::ScriptElement,
    Library,
};

pub use crate::provider::{
    headless::{HeadlessHost, HeadlessProvider},
    html::{HtmlHost, HtmlProvider},
    MapId, MapOptions, OverlayId,
};

pub use crate::traits::{MapsProvider, Overlay, ScriptHost};

pub use crate::ui::popup::{Popup, PopupManager};

pub use crate::{Error as MapError, LoadError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
