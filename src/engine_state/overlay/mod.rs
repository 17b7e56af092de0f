//! # Overlay Module
//!
//! Real-world building and road footprints that get stamped into generated terrain.
//!
//! ## Architecture
//!
//! * `OverlayProvider` - the boundary to whatever produces footprints (an HTTP client,
//!   a file, a test double). The engine only consumes the shapes defined here.
//! * `CachedOverlayProvider` - wraps any provider with a TTL'd LRU result cache keyed by
//!   request kind and parameters.
//! * `StaticOverlayProvider` - offline provider backed by a JSON footprint document.
//! * `fetch_overlay` - geocode then footprint query, producing the `OverlayData` the
//!   stamper consumes.
//!
//! Overlay data is strictly additive. Any provider failure means "no overlay" and terrain
//! generation carries on with procedural terrain only.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod cache;
pub mod static_provider;

pub use cache::CachedOverlayProvider;
pub use static_provider::StaticOverlayProvider;

/// The address the reference world is built around.
pub const DEFAULT_ADDRESS: &str = "53 Buckland Street, Epsom VIC 3551, Australia";
/// Footprint query radius in metres.
pub const DEFAULT_RADIUS_METRES: f64 = 300.0;
/// Provider results stay cached for ten minutes.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Where overlay data comes from and how long provider results are reused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub address: String,
    pub radius_metres: f64,
    /// Footprint JSON document for the offline provider.
    pub footprints_file: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            radius_metres: DEFAULT_RADIUS_METRES,
            footprints_file: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_capacity: 64,
        }
    }
}

/// A resolved address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

/// One building outline or road polyline as `[lat, lon]` pairs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub id: String,
    pub geometry: Vec<[f64; 2]>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Everything a footprint query returns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FootprintsResponse {
    #[serde(default)]
    pub buildings: Vec<Footprint>,
    #[serde(default)]
    pub roads: Vec<Footprint>,
}

/// Footprints plus the geographic point the world origin is anchored to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayData {
    pub center_lat: f64,
    pub center_lon: f64,
    pub buildings: Vec<Footprint>,
    pub roads: Vec<Footprint>,
}

/// Errors raised at the provider boundary.
#[derive(Debug)]
pub enum OverlayError {
    /// The address could not be resolved.
    NotFound(String),
    /// The provider failed for any other reason.
    Provider(String),
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::NotFound(address) => write!(f, "address not found: {address}"),
            OverlayError::Provider(message) => write!(f, "overlay provider failed: {message}"),
            OverlayError::Io(e) => write!(f, "overlay I/O error: {e}"),
            OverlayError::Parse(e) => write!(f, "overlay data is malformed: {e}"),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OverlayError::Io(e) => Some(e),
            OverlayError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(e: std::io::Error) -> Self {
        OverlayError::Io(e)
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(e: serde_json::Error) -> Self {
        OverlayError::Parse(e)
    }
}

/// Source of geocoding and footprint data.
///
/// Methods take `&mut self` so implementations can keep caches or connection state.
pub trait OverlayProvider: Send + Sync {
    fn geocode(&mut self, address: &str) -> Result<GeocodeResult, OverlayError>;

    fn fetch_footprints(
        &mut self,
        lat: f64,
        lon: f64,
        radius_metres: f64,
    ) -> Result<FootprintsResponse, OverlayError>;
}

impl<P: OverlayProvider + ?Sized> OverlayProvider for Box<P> {
    fn geocode(&mut self, address: &str) -> Result<GeocodeResult, OverlayError> {
        (**self).geocode(address)
    }

    fn fetch_footprints(
        &mut self,
        lat: f64,
        lon: f64,
        radius_metres: f64,
    ) -> Result<FootprintsResponse, OverlayError> {
        (**self).fetch_footprints(lat, lon, radius_metres)
    }
}

/// Resolves `address` and fetches the footprints around it.
///
/// # Arguments
/// * `provider` - Any overlay provider
/// * `address` - Free-form address to anchor the world on
/// * `radius_metres` - Query radius around the resolved point
///
/// # Returns
/// The overlay anchored on the geocoded point, or the first provider error.
pub fn fetch_overlay(
    provider: &mut dyn OverlayProvider,
    address: &str,
    radius_metres: f64,
) -> Result<OverlayData, OverlayError> {
    let center = provider.geocode(address)?;
    let footprints = provider.fetch_footprints(center.lat, center.lon, radius_metres)?;
    Ok(OverlayData {
        center_lat: center.lat,
        center_lon: center.lon,
        buildings: footprints.buildings,
        roads: footprints.roads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl OverlayProvider for Unreachable {
        fn geocode(&mut self, address: &str) -> Result<GeocodeResult, OverlayError> {
            Err(OverlayError::NotFound(address.to_string()))
        }

        fn fetch_footprints(&mut self, _: f64, _: f64, _: f64) -> Result<FootprintsResponse, OverlayError> {
            Err(OverlayError::Provider("offline".to_string()))
        }
    }

    #[test]
    fn geocode_failure_surfaces_as_error() {
        let error = fetch_overlay(&mut Unreachable, "nowhere", 10.0).unwrap_err();
        assert!(matches!(error, OverlayError::NotFound(ref a) if a == "nowhere"));
        assert_eq!(error.to_string(), "address not found: nowhere");
    }

    #[test]
    fn footprint_json_uses_lat_lon_pairs() {
        let json = r#"{"buildings":[{"id":"7","geometry":[[-36.7,144.2]],"tags":{"building":"house"}}]}"#;
        let parsed: FootprintsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.buildings[0].geometry[0], [-36.7, 144.2]);
        assert_eq!(parsed.buildings[0].tags["building"], "house");
        assert!(parsed.roads.is_empty());
    }
}
