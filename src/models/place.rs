//! Place models: coordinates, raw geodata records and normalized places

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Geographic coordinate in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Coordinate {
    /// Create a new coordinate
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// A coordinate is valid when both components are finite and within
    /// standard latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Generate a cache key for this coordinate, rounded to 4 decimal
    /// places (roughly 11 m of precision).
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("places:{:.4}:{:.4}", self.lat, self.lon)
    }
}

/// Centroid coordinate attached to area-shaped geodata records
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct CenterCoordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Unprocessed geodata result as returned by the upstream query service.
///
/// Node-shaped records carry a direct `lat`/`lon`; way- and
/// relation-shaped records carry a `center` centroid instead. Records are
/// produced by a [`crate::places::PlaceSource`], consumed once by the
/// planner's normalization step, then discarded.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RawPlaceRecord {
    /// Key/value attribute tags (e.g. `name`, `tourism`, `historic`)
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<CenterCoordinate>,
}

impl RawPlaceRecord {
    /// Look up a tag value by key
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Cross-references into external knowledge bases
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ExternalIds {
    /// Wikidata entity reference
    pub wikidata: Option<String>,
    /// Wikipedia article reference
    pub wikipedia: Option<String>,
}

impl ExternalIds {
    /// Whether any cross-reference is present
    #[must_use]
    pub fn any(&self) -> bool {
        self.wikidata.is_some() || self.wikipedia.is_some()
    }
}

/// A normalized point of interest.
///
/// Only records with a non-empty name and a valid coordinate survive
/// normalization, so every `Place` upholds both invariants.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    /// First non-empty category tag; may be empty
    pub category: String,
    pub coordinate: Coordinate,
    pub external_ids: ExternalIds,
    /// Great-circle distance from the request origin in kilometers
    pub distance_km: f64,
}
