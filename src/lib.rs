//! Wayfarer - day-by-day trip itinerary planning backed by OpenStreetMap geodata
//!
//! This library provides the core functionality for fetching points of
//! interest near a starting location, ranking them by distance and
//! notability, and assembling a day-ordered travel itinerary.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod places;
pub mod planner;
pub mod web;

// Re-export core types for public API
pub use cache::TtlCache;
pub use config::WayfarerConfig;
pub use error::WayfarerError;
pub use models::{
    Coordinate, DistanceBand, ItineraryEntry, ItineraryPlan, Place, PlaceSummary, RawPlaceRecord,
};
pub use places::{OsmPlaceSource, PlaceSource, PlaceSourceError};
pub use planner::ItineraryPlanner;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WayfarerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
