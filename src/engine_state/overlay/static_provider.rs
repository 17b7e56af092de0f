//! Offline overlay provider backed by a JSON footprint document.
//!
//! The document looks like
//!
//! ```json
//! {
//!   "center": { "lat": -36.7, "lon": 144.2, "display_name": "Epsom" },
//!   "buildings": [ { "id": "1", "geometry": [[-36.7, 144.2], ...], "tags": { "building": "house" } } ],
//!   "roads": [ ... ]
//! }
//! ```
//!
//! Every address geocodes to `center`. A footprint query returns the footprints with at
//! least one point inside the square of `radius` metres around the queried point.

use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use super::{Footprint, FootprintsResponse, GeocodeResult, OverlayError, OverlayProvider};

/// Rough metres per degree of latitude.
const METRES_PER_DEGREE: f64 = 111_000.0;

#[derive(Clone, Debug, Deserialize)]
pub struct StaticOverlayProvider {
    center: GeocodeResult,
    #[serde(default)]
    buildings: Vec<Footprint>,
    #[serde(default)]
    roads: Vec<Footprint>,
}

impl StaticOverlayProvider {
    pub fn new(center: GeocodeResult, footprints: FootprintsResponse) -> Self {
        Self {
            center,
            buildings: footprints.buildings,
            roads: footprints.roads,
        }
    }

    /// Reads a footprint document from disk.
    ///
    /// # Errors
    /// `OverlayError::Io` if the file cannot be read, `OverlayError::Parse` if it is not
    /// a valid document.
    pub fn from_file(path: &Path) -> Result<Self, OverlayError> {
        let text = fs::read_to_string(path)?;
        let provider: StaticOverlayProvider = serde_json::from_str(&text)?;
        info!(
            "Loaded {} buildings and {} roads from {}",
            provider.buildings.len(),
            provider.roads.len(),
            path.display()
        );
        Ok(provider)
    }
}

fn within(footprint: &Footprint, lat: f64, lon: f64, radius_degrees: f64) -> bool {
    footprint.geometry.iter().any(|[p_lat, p_lon]| {
        (p_lat - lat).abs() <= radius_degrees && (p_lon - lon).abs() <= radius_degrees
    })
}

impl OverlayProvider for StaticOverlayProvider {
    fn geocode(&mut self, address: &str) -> Result<GeocodeResult, OverlayError> {
        if address.trim().is_empty() {
            return Err(OverlayError::NotFound(address.to_string()));
        }
        Ok(self.center.clone())
    }

    fn fetch_footprints(
        &mut self,
        lat: f64,
        lon: f64,
        radius_metres: f64,
    ) -> Result<FootprintsResponse, OverlayError> {
        let radius_degrees = radius_metres / METRES_PER_DEGREE;
        let select = |footprints: &[Footprint]| -> Vec<Footprint> {
            footprints
                .iter()
                .filter(|footprint| within(footprint, lat, lon, radius_degrees))
                .cloned()
                .collect()
        };
        Ok(FootprintsResponse {
            buildings: select(&self.buildings),
            roads: select(&self.roads),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint(id: &str, lat: f64, lon: f64) -> Footprint {
        Footprint {
            id: id.to_string(),
            geometry: vec![[lat, lon]],
            ..Default::default()
        }
    }

    #[test]
    fn footprints_are_filtered_by_radius() {
        let center = GeocodeResult {
            lat: 0.0,
            lon: 0.0,
            display_name: "origin".to_string(),
        };
        let mut provider = StaticOverlayProvider::new(
            center,
            FootprintsResponse {
                buildings: vec![footprint("near", 0.001, 0.001), footprint("far", 0.5, 0.5)],
                roads: vec![footprint("road", -0.002, 0.0)],
            },
        );

        let response = provider.fetch_footprints(0.0, 0.0, 300.0).unwrap();
        let ids: Vec<_> = response.buildings.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["near"]);
        assert_eq!(response.roads.len(), 1);
    }

    #[test]
    fn blank_address_is_not_found() {
        let mut provider = StaticOverlayProvider::new(
            GeocodeResult {
                lat: 0.0,
                lon: 0.0,
                display_name: String::new(),
            },
            FootprintsResponse::default(),
        );
        assert!(matches!(provider.geocode("  "), Err(OverlayError::NotFound(_))));
        assert!(provider.geocode("anywhere").is_ok());
    }

    #[test]
    fn parses_a_document() {
        let json = r#"{"center":{"lat":1.5,"lon":2.5,"display_name":"here"},"roads":[{"id":"r","geometry":[[1.5,2.5]]}]}"#;
        let mut provider: StaticOverlayProvider = serde_json::from_str(json).unwrap();
        assert_eq!(provider.geocode("x").unwrap().display_name, "here");
        assert_eq!(provider.fetch_footprints(1.5, 2.5, 10.0).unwrap().roads.len(), 1);
    }
}
