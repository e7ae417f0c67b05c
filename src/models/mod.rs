//! Data models for the Wayfarer application
//!
//! This module contains the core domain models organized by concern:
//! - Place: geographic coordinates, raw geodata records and normalized places
//! - Itinerary: distance bands, per-day entries and the assembled plan

pub mod itinerary;
pub mod place;

// Re-export all public types for convenient access
pub use itinerary::{DistanceBand, ItineraryEntry, ItineraryPlan, PlaceSummary, TRAVEL_MODE};
pub use place::{CenterCoordinate, Coordinate, ExternalIds, Place, RawPlaceRecord};
