//! In-memory provider
//!
//! Records every map, overlay and click listener in a [`Scene`] so callers can
//! inspect what would have been drawn. Constructors fail with
//! [`MapError::LibraryNotLoaded`] until the library providing them has been
//! imported, as the real provider does.

use super::{decode_path, MapId, MapOptions, OverlayId};
use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::{marker::Marker, vector::Polyline},
    loader::{host::ScriptElement, Library},
    prelude::HashSet,
    traits::{MapsProvider, ScriptHost},
    ui::popup::{Popup, PopupManager},
    MapError, Result,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneMap {
    pub id: MapId,
    pub options: MapOptions,
    /// Last bounds passed to `fit_bounds`
    pub fitted: Option<LatLngBounds>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenePolyline {
    pub id: OverlayId,
    pub map: MapId,
    pub polyline: Polyline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneMarker {
    pub id: OverlayId,
    pub map: MapId,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneInfoWindow {
    pub id: OverlayId,
    pub popup: Popup,
    /// Marker the window was last opened on
    pub anchor: Option<OverlayId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickListener {
    pub map: MapId,
    pub marker: OverlayId,
    pub info_window: OverlayId,
}

/// Snapshot of everything drawn on a [`HeadlessProvider`]
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub maps: Vec<SceneMap>,
    pub polylines: Vec<ScenePolyline>,
    pub markers: Vec<SceneMarker>,
    pub info_windows: Vec<SceneInfoWindow>,
    pub listeners: Vec<ClickListener>,
}

impl Scene {
    pub fn marker(&self, id: OverlayId) -> Option<&SceneMarker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn info_window(&self, id: OverlayId) -> Option<&SceneInfoWindow> {
        self.info_windows.iter().find(|w| w.id == id)
    }

    pub fn open_info_windows(&self) -> impl Iterator<Item = &SceneInfoWindow> {
        self.info_windows.iter().filter(|w| w.popup.visible)
    }
}

#[derive(Debug, Default)]
struct SceneState {
    scene: Scene,
    popups: PopupManager,
}

#[derive(Debug, Default)]
pub struct HeadlessProvider {
    libraries: Mutex<HashSet<Library>>,
    state: Mutex<SceneState>,
    next_id: AtomicU32,
}

impl HeadlessProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose script was loaded with `libraries` already included
    pub fn with_libraries(libraries: impl IntoIterator<Item = Library>) -> Self {
        let provider = Self::new();
        lock(&provider.libraries).extend(libraries);
        provider
    }

    pub fn scene(&self) -> Scene {
        lock(&self.state).scene.clone()
    }

    pub fn imported_libraries(&self) -> Vec<Library> {
        let mut libraries: Vec<Library> = lock(&self.libraries).iter().cloned().collect();
        libraries.sort();
        libraries
    }

    /// Simulate a click on `marker`, opening every info window bound to it.
    /// Returns the windows that opened.
    pub fn click(&self, marker: OverlayId) -> Result<Vec<OverlayId>> {
        let mut state = lock(&self.state);
        let SceneState { scene, popups } = &mut *state;

        if scene.marker(marker).is_none() {
            return Err(MapError::Provider(format!("no marker {}", marker)));
        }

        let bound: Vec<OverlayId> = scene
            .listeners
            .iter()
            .filter(|l| l.marker == marker)
            .map(|l| l.info_window)
            .collect();

        for window in scene
            .info_windows
            .iter_mut()
            .filter(|w| bound.contains(&w.id))
        {
            popups.show_popup(&window.popup.id);
            window.popup.show();
            window.anchor = Some(marker);
        }
        log::debug!("click on {} opened {} info window(s)", marker, bound.len());
        Ok(bound)
    }

    /// Close an open info window
    pub fn close(&self, info_window: OverlayId) {
        let mut state = lock(&self.state);
        let SceneState { scene, popups } = &mut *state;
        if let Some(window) = scene.info_windows.iter_mut().find(|w| w.id == info_window) {
            popups.hide_popup(&window.popup.id);
            window.popup.hide();
        }
    }

    pub fn open_popup_count(&self) -> usize {
        lock(&self.state).popups.visible_count()
    }

    fn require(&self, library: &Library) -> Result<()> {
        if lock(&self.libraries).contains(library) {
            Ok(())
        } else {
            Err(MapError::LibraryNotLoaded(library.to_string()))
        }
    }

    fn next_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn require_map(scene: &Scene, map: MapId) -> Result<()> {
        if scene.maps.iter().any(|m| m.id == map) {
            Ok(())
        } else {
            Err(MapError::Provider(format!("no map {}", map)))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl MapsProvider for HeadlessProvider {
    async fn import_library(&self, library: &Library) -> Result<()> {
        if lock(&self.libraries).insert(library.clone()) {
            log::debug!("imported {}", library);
        }
        Ok(())
    }

    fn has_library(&self, library: &Library) -> bool {
        lock(&self.libraries).contains(library)
    }

    fn create_map(&self, options: &MapOptions) -> Result<MapId> {
        self.require(&Library::Maps)?;
        let id = MapId(self.next_id());
        lock(&self.state).scene.maps.push(SceneMap {
            id,
            options: options.clone(),
            fitted: None,
        });
        Ok(id)
    }

    fn fit_bounds(&self, map: MapId, bounds: &LatLngBounds) -> Result<()> {
        self.require(&Library::Core)?;
        let mut state = lock(&self.state);
        let scene_map = state
            .scene
            .maps
            .iter_mut()
            .find(|m| m.id == map)
            .ok_or_else(|| MapError::Provider(format!("no map {}", map)))?;
        scene_map.fitted = Some(*bounds);
        Ok(())
    }

    fn decode_path(&self, encoded: &str) -> Result<Vec<LatLng>> {
        self.require(&Library::Geometry)?;
        decode_path(encoded)
    }

    fn add_polyline(&self, map: MapId, polyline: &Polyline) -> Result<OverlayId> {
        self.require(&Library::Maps)?;
        let id = OverlayId(self.next_id());
        let mut state = lock(&self.state);
        Self::require_map(&state.scene, map)?;
        state.scene.polylines.push(ScenePolyline {
            id,
            map,
            polyline: polyline.clone(),
        });
        Ok(id)
    }

    fn add_marker(&self, map: MapId, marker: &Marker) -> Result<OverlayId> {
        self.require(&Library::from(marker.kind().library()))?;
        let id = OverlayId(self.next_id());
        let mut state = lock(&self.state);
        Self::require_map(&state.scene, map)?;
        state.scene.markers.push(SceneMarker {
            id,
            map,
            marker: marker.clone(),
        });
        Ok(id)
    }

    fn create_info_window(&self, popup: &Popup) -> Result<OverlayId> {
        self.require(&Library::Maps)?;
        let id = OverlayId(self.next_id());
        let mut popup = popup.clone();
        popup.hide();

        let mut state = lock(&self.state);
        state.popups.add_popup(popup.clone());
        state.scene.info_windows.push(SceneInfoWindow {
            id,
            popup,
            anchor: None,
        });
        Ok(id)
    }

    fn open_on_click(&self, map: MapId, marker: OverlayId, info_window: OverlayId) -> Result<()> {
        let mut state = lock(&self.state);
        if state.scene.marker(marker).is_none() {
            return Err(MapError::Provider(format!("no marker {}", marker)));
        }
        if state.scene.info_window(info_window).is_none() {
            return Err(MapError::Provider(format!("no info window {}", info_window)));
        }
        state.scene.listeners.push(ClickListener {
            map,
            marker,
            info_window,
        });
        Ok(())
    }
}

/// [`ScriptHost`] that "loads" the script by creating a [`HeadlessProvider`]
#[derive(Debug, Default)]
pub struct HeadlessHost {
    nonce: Option<String>,
    failure: Option<String>,
    injected: Mutex<Vec<ScriptElement>>,
    provider: Mutex<Option<Arc<HeadlessProvider>>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose every injection fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Pretend the page already carries a script with this nonce
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn injected(&self) -> Vec<ScriptElement> {
        lock(&self.injected).clone()
    }

    pub fn injection_count(&self) -> usize {
        lock(&self.injected).len()
    }

    /// Provider created by the last successful injection
    pub fn provider(&self) -> Option<Arc<HeadlessProvider>> {
        lock(&self.provider).clone()
    }
}

#[async_trait]
impl ScriptHost for HeadlessHost {
    fn existing_nonce(&self) -> Option<String> {
        self.nonce.clone()
    }

    async fn inject(&self, script: ScriptElement) -> Result<Arc<dyn MapsProvider>> {
        let libraries = script.libraries();
        lock(&self.injected).push(script);

        if let Some(reason) = &self.failure {
            return Err(MapError::Provider(reason.clone()));
        }

        let provider = Arc::new(HeadlessProvider::with_libraries(libraries));
        *lock(&self.provider) = Some(Arc::clone(&provider));
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::marker::MarkerKind;
    use crate::layers::vector::LineStyle;

    #[tokio::test]
    async fn test_constructors_require_libraries() {
        let provider = HeadlessProvider::new();
        let options = MapOptions::new("map", "DEMO_MAP_ID");
        assert!(matches!(
            provider.create_map(&options),
            Err(MapError::LibraryNotLoaded(name)) if name == "maps"
        ));

        provider.import_library(&Library::Maps).await.unwrap();
        let map = provider.create_map(&options).unwrap();

        let advanced = Marker::new("m".into(), LatLng::new(1.0, 2.0), MarkerKind::Advanced);
        assert!(provider.add_marker(map, &advanced).is_err());
        let classic = Marker::new("c".into(), LatLng::new(1.0, 2.0), MarkerKind::Classic);
        assert!(provider.add_marker(map, &classic).is_ok());

        assert!(provider.decode_path("_p~iF~ps|U").is_err());
        assert!(provider
            .fit_bounds(map, &LatLngBounds::from_coords(1.0, 2.0, 3.0, 4.0))
            .is_err());
    }

    #[tokio::test]
    async fn test_click_opens_bound_window() {
        let provider = HeadlessProvider::with_libraries(Library::route_map());
        let map = provider
            .create_map(&MapOptions::new("map", "DEMO_MAP_ID"))
            .unwrap();
        let position = LatLng::new(44.0, -79.0);
        let marker = provider
            .add_marker(map, &Marker::new("m".into(), position, MarkerKind::Advanced))
            .unwrap();
        let window = provider
            .create_info_window(&Popup::new("p".into(), position, "<p>hi</p>".into()))
            .unwrap();
        provider.open_on_click(map, marker, window).unwrap();

        assert_eq!(provider.scene().open_info_windows().count(), 0);
        assert_eq!(provider.click(marker).unwrap(), vec![window]);

        let scene = provider.scene();
        let opened = scene.info_window(window).unwrap();
        assert!(opened.popup.visible);
        assert_eq!(opened.anchor, Some(marker));
        assert_eq!(provider.open_popup_count(), 1);

        provider.close(window);
        assert_eq!(provider.open_popup_count(), 0);
        assert!(provider.click(OverlayId(999)).is_err());
    }

    #[tokio::test]
    async fn test_polyline_needs_existing_map() {
        let provider = HeadlessProvider::with_libraries([Library::Maps]);
        let line = Polyline::new("route".into(), vec![], LineStyle::route());
        assert!(provider.add_polyline(MapId(42), &line).is_err());
    }

    #[tokio::test]
    async fn test_host_records_injection() {
        let host = HeadlessHost::new().with_nonce("abc");
        assert_eq!(host.existing_nonce().as_deref(), Some("abc"));

        let url = url::Url::parse("https://example.com/js?libraries=maps%2Cgeometry").unwrap();
        let provider = host.inject(ScriptElement::new(url, "initMap")).await.unwrap();

        assert!(provider.has_library(&Library::Maps));
        assert!(provider.has_library(&Library::Geometry));
        assert!(!provider.has_library(&Library::Marker));
        assert_eq!(host.injection_count(), 1);
        assert!(host.provider().is_some());
    }
}
