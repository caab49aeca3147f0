//! Standalone HTML page output
//!
//! [`HtmlProvider`] turns each provider call into a JavaScript statement of an
//! `initMap` callback. The finished page holds that callback followed by the
//! asynchronous script tag that loads the real library and invokes it.
//! Paths are decoded up front and written out as literals.

use super::{bounds_literal, decode_path, MapId, MapOptions, OverlayId};
use crate::{
    core::{
        config::is_valid_container_id,
        geo::{LatLng, LatLngBounds},
    },
    layers::{marker::Marker, vector::Polyline},
    loader::{host::ScriptElement, Library},
    traits::{MapsProvider, Overlay, ScriptHost},
    ui::popup::{escape_html, Popup},
    MapError, Result,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>PAGETITLE</title>
    <style>
      html, body { height: 100%; margin: 0; padding: 0; }
      MAPCONTAINERS { height: 100%; }
    </style>
  </head>
  <body>
MAPDIVS
    <script INLINENONCE>
      async function CALLBACKNAME() {
INSERTSTATEMENTSHERE
      }
      window.CALLBACKNAME = CALLBACKNAME;
    </script>
    SCRIPTTAG
  </body>
</html>
"#;

const STATEMENT_INDENT: &str = "        ";

/// JSON text that is safe inside an inline `<script>`. Markup characters
/// and the JavaScript line separators only occur inside string literals,
/// where their `\u` escapes decode to the same text.
fn js_value(value: &Value) -> String {
    let json = value.to_string();
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// Substitutes every placeholder in one scan of `template`, so replacement
/// text is never searched for further placeholders
fn fill_template(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while !rest.is_empty() {
        let next = fields
            .iter()
            .filter_map(|(name, value)| rest.find(name).map(|at| (at, *name, *value)))
            .min_by_key(|(at, name, _)| (*at, std::cmp::Reverse(name.len())));
        match next {
            Some((at, name, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + name.len()..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }
    out
}

fn js_string(text: &str) -> String {
    js_value(&Value::String(text.to_string()))
}

fn library_binding(library: &Library) -> String {
    let name: String = library
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("lib_{}", name)
}

fn map_var(map: MapId) -> String {
    format!("map{}", map.0)
}

fn overlay_var(overlay: OverlayId) -> String {
    format!("overlay{}", overlay.0)
}

#[derive(Debug, Default)]
struct PageState {
    libraries: Vec<Library>,
    containers: Vec<String>,
    maps: Vec<MapId>,
    markers: Vec<OverlayId>,
    info_windows: Vec<OverlayId>,
    statements: Vec<String>,
}

impl PageState {
    fn require(&self, library: &Library) -> Result<()> {
        if self.libraries.contains(library) {
            Ok(())
        } else {
            Err(MapError::LibraryNotLoaded(library.to_string()))
        }
    }

    fn require_map(&self, map: MapId) -> Result<()> {
        if self.maps.contains(&map) {
            Ok(())
        } else {
            Err(MapError::Provider(format!("no map {}", map)))
        }
    }
}

#[derive(Debug)]
pub struct HtmlProvider {
    script: ScriptElement,
    state: Mutex<PageState>,
    next_id: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HtmlProvider {
    /// Provider for a page loading the library with `script`; libraries
    /// named in its URL count as imported
    pub fn new(script: ScriptElement) -> Self {
        let state = PageState {
            libraries: script.libraries(),
            ..PageState::default()
        };
        Self {
            script,
            state: Mutex::new(state),
            next_id: AtomicU32::new(0),
        }
    }

    pub fn script(&self) -> &ScriptElement {
        &self.script
    }

    pub fn render_page(&self, title: &str) -> String {
        let state = lock(&self.state);

        let mut body: Vec<String> = state
            .libraries
            .iter()
            .map(|library| {
                format!(
                    "const {} = await google.maps.importLibrary({});",
                    library_binding(library),
                    js_string(library.as_str())
                )
            })
            .collect();
        body.extend(state.statements.iter().cloned());
        let body = body
            .iter()
            .map(|line| format!("{}{}", STATEMENT_INDENT, line))
            .collect::<Vec<_>>()
            .join("\n");

        let selectors = state
            .containers
            .iter()
            .map(|id| format!("#{}", id))
            .collect::<Vec<_>>()
            .join(", ");
        let divs = state
            .containers
            .iter()
            .map(|id| format!("    <div id=\"{}\"></div>", escape_html(id)))
            .collect::<Vec<_>>()
            .join("\n");
        let inline_open = match &self.script.nonce {
            Some(nonce) => format!("<script nonce=\"{}\">", escape_html(nonce)),
            None => "<script>".to_string(),
        };

        let title = escape_html(title);
        let script_tag = self.script.to_html();
        fill_template(
            PAGE_TEMPLATE,
            &[
                ("PAGETITLE", &title),
                ("MAPCONTAINERS", &selectors),
                ("MAPDIVS", &divs),
                ("<script INLINENONCE>", &inline_open),
                ("CALLBACKNAME", &self.script.callback),
                ("SCRIPTTAG", &script_tag),
                ("INSERTSTATEMENTSHERE", &body),
            ],
        )
    }

    fn next_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn new_overlay(
        &self,
        state: &mut PageState,
        map: MapId,
        library: &Library,
        constructor: &str,
        options: &Value,
    ) -> OverlayId {
        let id = OverlayId(self.next_id());
        state.statements.push(format!(
            "const {} = new {}.{}(Object.assign({}, {{ map: {} }}));",
            overlay_var(id),
            library_binding(library),
            constructor,
            js_value(options),
            map_var(map)
        ));
        id
    }
}

#[async_trait]
impl MapsProvider for HtmlProvider {
    async fn import_library(&self, library: &Library) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.libraries.contains(library) {
            state.libraries.push(library.clone());
        }
        Ok(())
    }

    fn has_library(&self, library: &Library) -> bool {
        lock(&self.state).libraries.contains(library)
    }

    fn create_map(&self, options: &MapOptions) -> Result<MapId> {
        if !is_valid_container_id(&options.container_id) {
            return Err(MapError::Config(format!(
                "invalid container id: {:?}",
                options.container_id
            )));
        }
        let mut state = lock(&self.state);
        state.require(&Library::Maps)?;

        let id = MapId(self.next_id());
        state.statements.push(format!(
            "const {} = new {}.Map(document.getElementById({}), {});",
            map_var(id),
            library_binding(&Library::Maps),
            js_string(&options.container_id),
            js_value(&options.to_json())
        ));
        state.maps.push(id);
        if !state.containers.contains(&options.container_id) {
            state.containers.push(options.container_id.clone());
        }
        Ok(id)
    }

    fn fit_bounds(&self, map: MapId, bounds: &LatLngBounds) -> Result<()> {
        let mut state = lock(&self.state);
        state.require(&Library::Core)?;
        state.require_map(map)?;
        state.statements.push(format!(
            "{}.fitBounds({});",
            map_var(map),
            js_value(&bounds_literal(bounds))
        ));
        Ok(())
    }

    fn decode_path(&self, encoded: &str) -> Result<Vec<LatLng>> {
        lock(&self.state).require(&Library::Geometry)?;
        decode_path(encoded)
    }

    fn add_polyline(&self, map: MapId, polyline: &Polyline) -> Result<OverlayId> {
        let mut state = lock(&self.state);
        state.require(&Library::Maps)?;
        state.require_map(map)?;
        Ok(self.new_overlay(&mut state, map, &Library::Maps, "Polyline", &polyline.options()))
    }

    fn add_marker(&self, map: MapId, marker: &Marker) -> Result<OverlayId> {
        let library = Library::from(marker.kind().library());
        let mut state = lock(&self.state);
        state.require(&library)?;
        state.require_map(map)?;
        let id = self.new_overlay(
            &mut state,
            map,
            &library,
            marker.kind().constructor(),
            &marker.options(),
        );
        state.markers.push(id);
        Ok(id)
    }

    fn create_info_window(&self, popup: &Popup) -> Result<OverlayId> {
        let mut state = lock(&self.state);
        state.require(&Library::Maps)?;

        let id = OverlayId(self.next_id());
        let options = json!({
            "content": popup.content,
            "position": { "lat": popup.position.lat, "lng": popup.position.lng },
        });
        state.statements.push(format!(
            "const {} = new {}.InfoWindow({});",
            overlay_var(id),
            library_binding(&Library::Maps),
            js_value(&options)
        ));
        state.info_windows.push(id);
        Ok(id)
    }

    fn open_on_click(&self, map: MapId, marker: OverlayId, info_window: OverlayId) -> Result<()> {
        let mut state = lock(&self.state);
        state.require_map(map)?;
        if !state.markers.contains(&marker) {
            return Err(MapError::Provider(format!("no marker {}", marker)));
        }
        if !state.info_windows.contains(&info_window) {
            return Err(MapError::Provider(format!("no info window {}", info_window)));
        }
        state.statements.push(format!(
            "{m}.addListener(\"click\", () => {w}.open({{ anchor: {m}, map: {map} }}));",
            m = overlay_var(marker),
            w = overlay_var(info_window),
            map = map_var(map)
        ));
        Ok(())
    }
}

/// [`ScriptHost`] producing an [`HtmlProvider`] per injected script
#[derive(Debug, Default)]
pub struct HtmlHost {
    nonce: Option<String>,
    provider: Mutex<Option<Arc<HtmlProvider>>>,
}

impl HtmlHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nonce of the page's content-security-policy, applied to both scripts
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn provider(&self) -> Option<Arc<HtmlProvider>> {
        lock(&self.provider).clone()
    }

    /// Page for the last injected script
    pub fn page(&self, title: &str) -> Result<String> {
        self.provider()
            .map(|provider| provider.render_page(title))
            .ok_or_else(|| MapError::Provider("no script has been injected".into()))
    }
}

#[async_trait]
impl ScriptHost for HtmlHost {
    fn existing_nonce(&self) -> Option<String> {
        self.nonce.clone()
    }

    async fn inject(&self, script: ScriptElement) -> Result<Arc<dyn MapsProvider>> {
        log::debug!("writing script tag for callback {}", script.callback);
        let provider = Arc::new(HtmlProvider::new(script));
        *lock(&self.provider) = Some(Arc::clone(&provider));
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::marker::MarkerKind;
    use url::Url;

    fn provider(libraries: &str) -> HtmlProvider {
        let url = Url::parse(&format!(
            "https://maps.googleapis.com/maps/api/js?libraries={}&callback=initMap",
            libraries
        ))
        .unwrap();
        HtmlProvider::new(ScriptElement::new(url, "initMap").with_nonce(Some("xyz".into())))
    }

    #[test]
    fn test_js_value_escapes_markup() {
        assert_eq!(js_string("</script>"), "\"\\u003c/script\\u003e\"");
        assert_eq!(js_string("a & b"), "\"a \\u0026 b\"");
        assert_eq!(js_string("x\u{2028}y\u{2029}"), "\"x\\u2028y\\u2029\"");
        let round: Value = serde_json::from_str(&js_string("<!--<script>")).unwrap();
        assert_eq!(round, "<!--<script>");
    }

    #[test]
    fn test_station_markup_stays_out_of_the_page() {
        let provider = provider("core,maps,marker");
        let map = provider
            .create_map(&MapOptions::new("map", "DEMO_MAP_ID"))
            .unwrap();
        let position = LatLng::new(2.0, 3.0);
        let marker = Marker::new("m".into(), position, MarkerKind::Classic)
            .with_title("<!--<script>");
        provider.add_marker(map, &marker).unwrap();
        provider
            .create_info_window(&Popup::new("p".into(), position, "<b>x</b></script>".into()))
            .unwrap();

        let page = provider.render_page("Trip");
        assert!(!page.contains("<!--<script>"));
        assert!(!page.contains("</script>\""));
        assert!(page.contains("\\u003c!--\\u003cscript\\u003e"));
        assert_eq!(page.matches("</script>").count(), 2);
    }

    #[test]
    fn test_title_is_not_rescanned_for_placeholders() {
        let provider = provider("maps");
        provider
            .create_map(&MapOptions::new("map", "DEMO_MAP_ID"))
            .unwrap();

        let page = provider.render_page("MAPDIVS SCRIPTTAG INSERTSTATEMENTSHERE");
        assert!(page.contains("<title>MAPDIVS SCRIPTTAG INSERTSTATEMENTSHERE</title>"));
        assert_eq!(page.matches("<div id=\"map\"></div>").count(), 1);
        assert_eq!(page.matches("<script async src=").count(), 1);
    }

    #[test]
    fn test_container_id_is_checked() {
        let provider = provider("maps");
        let options = MapOptions::new("map { color: red } #x", "DEMO_MAP_ID");
        assert!(matches!(provider.create_map(&options), Err(MapError::Config(_))));
    }

    #[test]
    fn test_page_layout() {
        let provider = provider("core,maps,marker");
        let map = provider
            .create_map(&MapOptions::new("map", "DEMO_MAP_ID"))
            .unwrap();
        provider
            .fit_bounds(map, &LatLngBounds::from_coords(1.0, 2.0, 3.0, 4.0))
            .unwrap();
        let position = LatLng::new(2.0, 3.0);
        let marker = provider
            .add_marker(map, &Marker::new("m".into(), position, MarkerKind::Advanced))
            .unwrap();
        let window = provider
            .create_info_window(&Popup::new("p".into(), position, "<b>A</b>".into()))
            .unwrap();
        provider.open_on_click(map, marker, window).unwrap();

        let page = provider.render_page("Trip");
        assert!(page.contains("<title>Trip</title>"));
        assert!(page.contains("<div id=\"map\"></div>"));
        assert!(page.contains("const lib_marker = await google.maps.importLibrary(\"marker\");"));
        assert!(page.contains("new lib_maps.Map(document.getElementById(\"map\")"));
        assert!(page.contains("map0.fitBounds("));
        assert!(page.contains("new lib_marker.AdvancedMarkerElement("));
        assert!(page.contains("addListener(\"click\""));
        assert!(page.contains("<script nonce=\"xyz\">"));
        assert!(page.contains("window.initMap = initMap;"));

        let inline = page.find("async function initMap()").unwrap();
        let loader = page.find("<script async src=").unwrap();
        assert!(inline < loader);
    }

    #[test]
    fn test_constructor_needs_library() {
        let provider = provider("maps");
        let map = provider
            .create_map(&MapOptions::new("map", "DEMO_MAP_ID"))
            .unwrap();
        let marker = Marker::new("m".into(), LatLng::new(0.0, 0.0), MarkerKind::Advanced);
        assert!(matches!(
            provider.add_marker(map, &marker),
            Err(MapError::LibraryNotLoaded(_))
        ));
        assert!(provider.decode_path("_p~iF~ps|U").is_err());
    }

    #[tokio::test]
    async fn test_host_page_after_inject() {
        let host = HtmlHost::new();
        assert!(host.page("x").is_err());

        let url = Url::parse("https://maps.googleapis.com/maps/api/js?callback=initMap").unwrap();
        let provider = host.inject(ScriptElement::new(url, "initMap")).await.unwrap();
        provider.import_library(&Library::Maps).await.unwrap();
        provider
            .create_map(&MapOptions::new("map", "DEMO_MAP_ID"))
            .unwrap();

        let page = host.page("Trip").unwrap();
        assert!(page.contains("importLibrary(\"maps\")"));
        assert!(page.contains("<script>"));
    }
}
