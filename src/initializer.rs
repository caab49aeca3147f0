//! Drawing a trip on a loaded provider
//!
//! [`MapInitializer::initialize`] runs strictly in order: import the
//! capability groups, create the map, fit it to the trip bounds, decode the
//! path, draw the halo and route lines, then place one marker with a
//! click-to-open popup per leg and a final one for the destination.

use crate::{
    core::{config::MapViewConfig, geo::LatLng, viewport::Viewport},
    data::trip::{ChargeStation, TripSummary},
    layers::{
        marker::{Marker, MarkerKind},
        vector::Polyline,
    },
    loader::Library,
    provider::{MapId, MapOptions, OverlayId},
    traits::MapsProvider,
    ui::popup::Popup,
    Result,
};

const HALO_Z_INDEX: i32 = 0;
const ROUTE_Z_INDEX: i32 = 1;

/// Handles created for one station marker
#[derive(Debug, Clone, PartialEq)]
pub struct StationOverlay {
    pub marker: OverlayId,
    pub info_window: OverlayId,
    pub kind: MarkerKind,
    pub popup: Popup,
}

/// Everything [`MapInitializer::initialize`] created
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRoute {
    pub map: MapId,
    /// Center and zoom the fitted bounds resolve to at the configured size
    pub viewport: Viewport,
    pub path: Vec<LatLng>,
    pub halo: OverlayId,
    pub route: OverlayId,
    /// One per leg, in trip order
    pub legs: Vec<StationOverlay>,
    pub destination: StationOverlay,
}

impl RenderedRoute {
    /// Every station overlay, destination last
    pub fn stations(&self) -> impl Iterator<Item = &StationOverlay> {
        self.legs.iter().chain(std::iter::once(&self.destination))
    }

    pub fn marker_count(&self) -> usize {
        self.legs.len() + 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapInitializer {
    view: MapViewConfig,
}

impl MapInitializer {
    pub fn new(view: MapViewConfig) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &MapViewConfig {
        &self.view
    }

    /// Draw `trip` on `provider`. The trip is validated first; nothing is
    /// drawn for invalid data.
    pub async fn initialize(
        &self,
        provider: &dyn MapsProvider,
        trip: &TripSummary,
    ) -> Result<RenderedRoute> {
        trip.validate()?;
        let view = &self.view;

        for library in Library::route_map() {
            provider.import_library(&library).await?;
        }
        for kind in [view.leg_marker, view.destination_marker] {
            let library = Library::from(kind.library());
            if !provider.has_library(&library) {
                provider.import_library(&library).await?;
            }
        }

        let map = provider.create_map(&MapOptions::new(&view.container_id, &view.map_id))?;
        log::debug!("created {} in #{}", map, view.container_id);

        provider.fit_bounds(map, &trip.bounds)?;
        let viewport = Viewport::from_bounds(&trip.bounds, view.size, view.fit_padding);

        let path = provider.decode_path(&trip.polyline)?;
        log::debug!("decoded route of {} points", path.len());

        let halo = Polyline::new("route-halo".into(), path.clone(), view.halo.clone())
            .with_z_index(HALO_Z_INDEX);
        let route = Polyline::new("route".into(), path.clone(), view.route.clone())
            .with_z_index(ROUTE_Z_INDEX);
        let halo = provider.add_polyline(map, &halo)?;
        let route = provider.add_polyline(map, &route)?;

        let mut legs = Vec::with_capacity(trip.legs_summary.len());
        for (index, leg) in trip.legs_summary.iter().enumerate() {
            legs.push(place_station(
                provider,
                map,
                format!("{}-leg-{}", map, index),
                &leg.charge_station,
                &leg.details(),
                view.leg_marker,
            )?);
        }

        let summary = &trip.destination_summary;
        let destination = place_station(
            provider,
            map,
            format!("{}-destination", map),
            &summary.charge_station,
            &summary.details(),
            view.destination_marker,
        )?;

        log::info!(
            "rendered route: {} points, {} leg markers, zoom {}",
            path.len(),
            legs.len(),
            viewport.zoom
        );

        Ok(RenderedRoute {
            map,
            viewport,
            path,
            halo,
            route,
            legs,
            destination,
        })
    }
}

fn place_station(
    provider: &dyn MapsProvider,
    map: MapId,
    id: String,
    station: &ChargeStation,
    details: &[(&str, &str)],
    kind: MarkerKind,
) -> Result<StationOverlay> {
    let marker = Marker::new(id.clone(), station.coord(), kind).with_title(station.name());
    let marker = provider.add_marker(map, &marker)?;

    let popup = Popup::for_station(format!("{}-popup", id), station, details);
    let info_window = provider.create_info_window(&popup)?;
    provider.open_on_click(map, marker, info_window)?;

    Ok(StationOverlay {
        marker,
        info_window,
        kind,
        popup,
    })
}
