//! Itinerary models: distance bands, per-day entries and the full plan

use crate::models::place::{Coordinate, Place};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Travel mode attached to every itinerary entry
pub const TRAVEL_MODE: &str = "Land";

/// Distance band a place falls into, measured from the request origin.
///
/// Intervals are exclusive on the lower bound and inclusive on the upper
/// bound, except `Near` which includes zero. Places beyond 300 km belong
/// to no band and are only reachable through the planner's fallback pool.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DistanceBand {
    /// 0-10 km
    Near,
    /// 10-100 km
    Mid,
    /// 100-300 km
    Far,
}

impl DistanceBand {
    /// Classify a distance into its band, or `None` beyond 300 km.
    /// Boundary values belong to the lower band.
    #[must_use]
    pub fn classify(distance_km: f64) -> Option<Self> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return None;
        }
        if distance_km <= 10.0 {
            Some(Self::Near)
        } else if distance_km <= 100.0 {
            Some(Self::Mid)
        } else if distance_km <= 300.0 {
            Some(Self::Far)
        } else {
            None
        }
    }

    /// Band label used when no real band applies: entries picked from the
    /// fallback pool are labeled by position, three per level, capped at
    /// the outermost band.
    #[must_use]
    pub fn from_position(index: usize) -> Self {
        match index / 3 {
            0 => Self::Near,
            1 => Self::Mid,
            _ => Self::Far,
        }
    }

    /// 1-based level number
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::Near => 1,
            Self::Mid => 2,
            Self::Far => 3,
        }
    }

    /// Display label ("Level 1" through "Level 3")
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Near => "Level 1",
            Self::Mid => "Level 2",
            Self::Far => "Level 3",
        }
    }

    /// All bands in rotation order
    #[must_use]
    pub fn all() -> [Self; 3] {
        [Self::Near, Self::Mid, Self::Far]
    }
}

/// One day of an assembled itinerary; immutable once emitted
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ItineraryEntry {
    /// 1-based day number, strictly increasing with no gaps within a plan
    pub day: u32,
    pub band: DistanceBand,
    pub place: Place,
    /// Flat base plus distance-proportional surcharge
    pub cost_units: i64,
}

/// Lightweight projection of a ranked place for map-marker display
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaceSummary {
    pub name: String,
    pub coordinate: Coordinate,
    pub distance_km: f64,
}

impl From<&Place> for PlaceSummary {
    fn from(place: &Place) -> Self {
        Self {
            name: place.name.clone(),
            coordinate: place.coordinate,
            distance_km: place.distance_km,
        }
    }
}

/// A fully materialized day-by-day plan
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItineraryPlan {
    pub origin: Coordinate,
    pub requested_days: u32,
    pub entries: Vec<ItineraryEntry>,
    /// Sum of the entries' cost units
    pub total_cost_units: i64,
    /// Ranked per-band candidate lists, capped at the band size limit but
    /// not filtered down to the days actually used
    pub band_summaries: BTreeMap<DistanceBand, Vec<PlaceSummary>>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
