//! Great-circle distance calculations

use crate::models::Coordinate;
use haversine::{Location as HaversineLocation, Units, distance};

/// Haversine distance between two coordinates in kilometers
/// (Earth radius 6371 km).
#[must_use]
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let from_haversine = HaversineLocation {
        latitude: from.lat,
        longitude: from.lon,
    };
    let to_haversine = HaversineLocation {
        latitude: to.lat,
        longitude: to.lon,
    };
    distance(from_haversine, to_haversine, Units::Kilometers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_of_latitude() {
        // 1 degree of latitude is about 111.19 km on a 6371 km sphere
        let a = Coordinate::new(12.0, 77.0);
        let b = Coordinate::new(13.0, 77.0);
        let d = distance_km(&a, &b);
        assert!((d - 111.19).abs() < 0.05, "got {d}");
    }

    #[test]
    fn test_zero_distance() {
        let origin = Coordinate::new(46.8182, 8.2275);
        assert!(distance_km(&origin, &origin).abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(12.9716, 77.5946);
        let b = Coordinate::new(13.3409, 74.7421);
        let ab = distance_km(&a, &b);
        let ba = distance_km(&b, &a);
        assert!((ab - ba).abs() < 1e-9);
        // Bengaluru to Udupi is roughly 310 km as the crow flies
        assert!(ab > 290.0 && ab < 330.0, "got {ab}");
    }
}
