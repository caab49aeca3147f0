//! Typed trip summary consumed by the map initializer
//!
//! The backend produces one JSON document per planned trip. It is parsed and
//! validated here, before any map object is created, so that rendering never
//! starts on partial data.

use crate::{
    constants::NOT_AVAILABLE,
    core::geo::{LatLng, LatLngBounds},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// A charge station as reported by the backend. Text fields the backend
/// could not fill are absent or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeStation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub open_date: Option<String>,
}

impl ChargeStation {
    pub fn coord(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn name(&self) -> &str {
        display(&self.name)
    }

    pub fn address(&self) -> &str {
        display(&self.address)
    }

    pub fn hours(&self) -> &str {
        display(&self.hours)
    }

    pub fn phone(&self) -> &str {
        display(&self.phone)
    }

    pub fn open_date(&self) -> &str {
        display(&self.open_date)
    }

    fn validate(&self, path: &str) -> Result<()> {
        if !self.coord().is_valid() {
            return Err(MapError::InvalidData(format!(
                "{path}: coordinate ({}, {}) is out of range",
                self.lat, self.lng
            )));
        }
        Ok(())
    }
}

fn display(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

/// A stop along the route and the leg driven after it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegSummary {
    pub charge_station: ChargeStation,
    #[serde(default)]
    pub charge_time: Option<String>,
    #[serde(default)]
    pub battery_start: Option<String>,
    #[serde(default)]
    pub battery_end: Option<String>,
    #[serde(default)]
    pub drive_time: Option<String>,
    #[serde(default)]
    pub drive_distance: Option<String>,
}

impl LegSummary {
    /// Trip statistics present for this stop, as (label, value) pairs
    pub fn details(&self) -> Vec<(&'static str, &str)> {
        present(&[
            ("Battery on arrival", &self.battery_start),
            ("Charge time", &self.charge_time),
            ("Battery on departure", &self.battery_end),
            ("Next leg", &self.drive_distance),
            ("Next leg drive time", &self.drive_time),
        ])
    }
}

/// The trip endpoint and whole-trip totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationSummary {
    pub charge_station: ChargeStation,
    #[serde(default)]
    pub battery_end: Option<String>,
    #[serde(default)]
    pub total_time: Option<String>,
    #[serde(default)]
    pub total_driving_time: Option<String>,
    #[serde(default)]
    pub total_charge_time: Option<String>,
    #[serde(default)]
    pub total_distance: Option<String>,
}

impl DestinationSummary {
    pub fn details(&self) -> Vec<(&'static str, &str)> {
        present(&[
            ("Battery on arrival", &self.battery_end),
            ("Total distance", &self.total_distance),
            ("Total time", &self.total_time),
            ("Total driving time", &self.total_driving_time),
            ("Total charge time", &self.total_charge_time),
        ])
    }
}

fn present<'a>(fields: &[(&'static str, &'a Option<String>)]) -> Vec<(&'static str, &'a str)> {
    fields
        .iter()
        .filter_map(|&(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
}

/// Everything the map needs to draw one trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub bounds: LatLngBounds,
    /// Encoded route path
    pub polyline: String,
    #[serde(default)]
    pub legs_summary: Vec<LegSummary>,
    pub destination_summary: DestinationSummary,
}

impl TripSummary {
    /// Parses and validates a trip summary
    pub fn from_json(json: &str) -> Result<Self> {
        let trip: Self = serde_json::from_str(json)?;
        trip.validate()?;
        Ok(trip)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let trip: Self = serde_json::from_reader(reader)?;
        trip.validate()?;
        Ok(trip)
    }

    /// Checks the invariants the initializer relies on
    pub fn validate(&self) -> Result<()> {
        let sw = self.bounds.south_west;
        let ne = self.bounds.north_east;
        if !sw.is_valid() {
            return Err(MapError::InvalidData(format!(
                "bounds.southwest: coordinate ({}, {}) is out of range",
                sw.lat, sw.lng
            )));
        }
        if !ne.is_valid() {
            return Err(MapError::InvalidData(format!(
                "bounds.northeast: coordinate ({}, {}) is out of range",
                ne.lat, ne.lng
            )));
        }
        if sw.lat > ne.lat {
            return Err(MapError::InvalidData(format!(
                "bounds: southwest latitude {} is north of northeast latitude {}",
                sw.lat, ne.lat
            )));
        }
        if self.polyline.trim().is_empty() {
            return Err(MapError::InvalidData("polyline: must not be empty".into()));
        }

        for (index, leg) in self.legs_summary.iter().enumerate() {
            leg.charge_station
                .validate(&format!("legs_summary[{index}].charge_station"))?;
        }
        self.destination_summary
            .charge_station
            .validate("destination_summary.charge_station")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIP: &str = r#"{
        "bounds": {"southwest": {"lat": 1, "lng": 2}, "northeast": {"lat": 3, "lng": 4}},
        "polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
        "legs_summary": [
            {
                "charge_station": {
                    "lat": 1.5, "lng": 2.5, "name": "Station A", "address": "1 Main St",
                    "hours": "24 hours daily", "phone": "555-0100", "open_date": "March 5 2019"
                },
                "charge_time": "12 mins 3 secs",
                "battery_start": "40.0%"
            }
        ],
        "destination_summary": {
            "charge_station": {"lat": 2.9, "lng": 3.9, "name": "Station B", "phone": null},
            "total_distance": "420.3 kms"
        }
    }"#;

    #[test]
    fn test_parse_trip() {
        let trip = TripSummary::from_json(TRIP).unwrap();
        assert_eq!(trip.bounds, LatLngBounds::from_coords(1.0, 2.0, 3.0, 4.0));
        assert_eq!(trip.legs_summary.len(), 1);

        let station = &trip.legs_summary[0].charge_station;
        assert_eq!(station.name(), "Station A");
        assert_eq!(station.open_date(), "March 5 2019");
        assert_eq!(station.coord(), LatLng::new(1.5, 2.5));
    }

    #[test]
    fn test_missing_fields_render_not_available() {
        let trip = TripSummary::from_json(TRIP).unwrap();
        let destination = &trip.destination_summary.charge_station;
        assert_eq!(destination.name(), "Station B");
        assert_eq!(destination.phone(), NOT_AVAILABLE);
        assert_eq!(destination.hours(), NOT_AVAILABLE);
    }

    #[test]
    fn test_details_only_lists_present_values() {
        let trip = TripSummary::from_json(TRIP).unwrap();
        assert_eq!(
            trip.legs_summary[0].details(),
            vec![("Battery on arrival", "40.0%"), ("Charge time", "12 mins 3 secs")]
        );
        assert_eq!(
            trip.destination_summary.details(),
            vec![("Total distance", "420.3 kms")]
        );
    }

    #[test]
    fn test_legs_default_to_empty() {
        let json = r#"{
            "bounds": {"southwest": {"lat": 1, "lng": 2}, "northeast": {"lat": 3, "lng": 4}},
            "polyline": "abc",
            "destination_summary": {"charge_station": {"lat": 2, "lng": 3}}
        }"#;
        let trip = TripSummary::from_json(json).unwrap();
        assert!(trip.legs_summary.is_empty());
    }

    #[test]
    fn test_out_of_range_station_names_field() {
        let json = TRIP.replace("\"lat\": 1.5", "\"lat\": 123.0");
        match TripSummary::from_json(&json) {
            Err(MapError::InvalidData(message)) => {
                assert!(message.starts_with("legs_summary[0].charge_station"), "{message}")
            }
            other => panic!("expected invalid data, got {other:?}"),
        }
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let json = TRIP.replace("\"lat\": 3, \"lng\": 4", "\"lat\": 0, \"lng\": 4");
        assert!(matches!(
            TripSummary::from_json(&json),
            Err(MapError::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_polyline_rejected() {
        let json = TRIP.replace("_p~iF~ps|U_ulLnnqC_mqNvxq`@", "");
        assert!(matches!(
            TripSummary::from_json(&json),
            Err(MapError::InvalidData(_))
        ));
    }

    #[test]
    fn test_missing_destination_is_a_parse_error() {
        let json = r#"{"bounds": {"southwest": {"lat": 1, "lng": 2}, "northeast": {"lat": 3, "lng": 4}}, "polyline": "x"}"#;
        assert!(matches!(
            TripSummary::from_json(json),
            Err(MapError::Serialization(_))
        ));
    }
}
