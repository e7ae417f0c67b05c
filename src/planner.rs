//! Itinerary construction
//!
//! This module turns raw geodata records into a day-by-day plan:
//! - Normalize heterogeneous records into places with computed distance
//! - Classify places as notable versus ordinary
//! - Bucket places into distance bands and rank within each band
//! - Round-robin across bands to fill the requested number of days

use crate::geo;
use crate::models::{
    Coordinate, DistanceBand, ItineraryEntry, ItineraryPlan, Place, PlaceSummary, RawPlaceRecord,
};
use chrono::{Days, Utc};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Maximum candidates kept per distance band after ranking
const MAX_BAND_SIZE: usize = 4;

/// Safety net against pathological rotation states. Normal termination is
/// the explicit all-bands-exhausted check, not this cap.
const ROTATION_SAFETY_CAP: usize = 500;

/// Flat base cost per itinerary entry
const BASE_COST_UNITS: i64 = 300;

/// Distance-proportional surcharge per kilometer
const COST_UNITS_PER_KM: f64 = 10.0;

/// Tag keys consulted for a place's category, in priority order
const CATEGORY_TAG_KEYS: [&str; 4] = ["tourism", "historic", "leisure", "amenity"];

/// Category substrings that mark a place as notable
const NOTABLE_CATEGORY_MARKERS: [&str; 5] =
    ["museum", "temple", "monument", "heritage", "tourism"];

/// Deterministic itinerary builder. Holds no state; all inputs arrive
/// per call.
pub struct ItineraryPlanner;

impl ItineraryPlanner {
    /// Build a plan from raw records already fetched via a place source.
    ///
    /// Never fails: when no places survive normalization the plan simply
    /// has zero entries and zero cost. Callers distinguish "no data" from
    /// "planner error" by checking `entries.len()`.
    #[must_use]
    pub fn plan(origin: Coordinate, requested_days: u32, records: Vec<RawPlaceRecord>) -> ItineraryPlan {
        let requested_days = requested_days.max(1);

        let places = Self::normalize(origin, records);
        debug!("{} places survived normalization", places.len());

        let ranked = Self::ranked_bands(&places);
        let entries = Self::assemble(requested_days, &ranked, &places);

        let total_cost_units = entries.iter().map(|e| e.cost_units).sum();
        let band_summaries = ranked
            .iter()
            .map(|(band, candidates)| {
                (*band, candidates.iter().map(PlaceSummary::from).collect())
            })
            .collect();

        let start_date = Utc::now().date_naive();
        let end_date = start_date
            .checked_add_days(Days::new(entries.len() as u64))
            .unwrap_or(start_date);

        ItineraryPlan {
            origin,
            requested_days,
            entries,
            total_cost_units,
            band_summaries,
            start_date,
            end_date,
        }
    }

    /// Normalize raw records into places, sorted ascending by distance.
    ///
    /// A record survives only with a non-empty name and a usable
    /// coordinate: the direct position when present, else the centroid of
    /// area-shaped records. Non-finite and zero-default components are
    /// treated as absent.
    pub fn normalize(origin: Coordinate, records: Vec<RawPlaceRecord>) -> Vec<Place> {
        let mut places: Vec<Place> = records
            .into_iter()
            .filter_map(|record| Self::normalize_record(origin, &record))
            .collect();
        places.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        places
    }

    fn normalize_record(origin: Coordinate, record: &RawPlaceRecord) -> Option<Place> {
        let name = record.tag("name")?.trim();
        if name.is_empty() {
            return None;
        }

        let usable = |v: f64| v.is_finite() && v != 0.0;
        let lat = record
            .lat
            .filter(|v| usable(*v))
            .or_else(|| record.center.map(|c| c.lat).filter(|v| usable(*v)))?;
        let lon = record
            .lon
            .filter(|v| usable(*v))
            .or_else(|| record.center.map(|c| c.lon).filter(|v| usable(*v)))?;

        let coordinate = Coordinate::new(lat, lon);
        if !coordinate.is_valid() {
            return None;
        }

        let category = CATEGORY_TAG_KEYS
            .iter()
            .filter_map(|key| record.tag(key))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
            .to_string();

        let non_empty = |key: &str| record.tag(key).filter(|v| !v.is_empty()).map(str::to_string);

        Some(Place {
            name: name.to_string(),
            category,
            coordinate,
            external_ids: crate::models::ExternalIds {
                wikidata: non_empty("wikidata"),
                wikipedia: non_empty("wikipedia"),
            },
            distance_km: geo::distance_km(&origin, &coordinate),
        })
    }

    /// A place is notable when it carries an external cross-reference or
    /// its category matches one of the well-known markers.
    #[must_use]
    pub fn is_notable(place: &Place) -> bool {
        if place.external_ids.any() {
            return true;
        }
        let category = place.category.to_lowercase();
        NOTABLE_CATEGORY_MARKERS
            .iter()
            .any(|marker| category.contains(marker))
    }

    /// Partition places into distance bands and rank each band:
    /// notable-first, then nearest-first, capped at the band size limit.
    /// Places beyond the outermost band are excluded here but remain in
    /// the distance-sorted fallback pool.
    pub fn ranked_bands(places: &[Place]) -> BTreeMap<DistanceBand, Vec<Place>> {
        let mut bands: BTreeMap<DistanceBand, Vec<Place>> =
            DistanceBand::all().into_iter().map(|b| (b, Vec::new())).collect();

        for place in places {
            if let Some(band) = DistanceBand::classify(place.distance_km) {
                if let Some(candidates) = bands.get_mut(&band) {
                    candidates.push(place.clone());
                }
            }
        }

        for candidates in bands.values_mut() {
            // stable sort keeps equal-distance order from the input
            candidates.sort_by(|a, b| {
                Self::is_notable(b)
                    .cmp(&Self::is_notable(a))
                    .then(a.distance_km.total_cmp(&b.distance_km))
            });
            candidates.truncate(MAX_BAND_SIZE);
        }

        bands
    }

    /// Fill days by round-robin selection across bands in fixed order,
    /// skipping exhausted bands and already-used places. Falls back to
    /// the full distance-sorted pool when the bands yield nothing.
    fn assemble(
        requested_days: u32,
        ranked: &BTreeMap<DistanceBand, Vec<Place>>,
        pool: &[Place],
    ) -> Vec<ItineraryEntry> {
        let rotation_order = DistanceBand::all();
        let all_empty = rotation_order
            .iter()
            .all(|band| ranked.get(band).is_none_or(Vec::is_empty));
        if all_empty {
            debug!("All bands empty, falling back to the full place pool");
            return Self::positional_fallback(requested_days, pool);
        }

        let mut entries: Vec<ItineraryEntry> = Vec::new();
        let mut used: HashSet<String> = HashSet::new();
        let mut rotation = 0usize;

        while entries.len() < requested_days as usize && rotation < ROTATION_SAFETY_CAP {
            let any_unused = rotation_order.iter().any(|band| {
                ranked
                    .get(band)
                    .is_some_and(|candidates| candidates.iter().any(|p| !used.contains(&p.name)))
            });
            if !any_unused {
                break;
            }

            let band = rotation_order[rotation % rotation_order.len()];
            if let Some(candidates) = ranked.get(&band) {
                if let Some(choice) = candidates.iter().find(|p| !used.contains(&p.name)) {
                    used.insert(choice.name.clone());
                    entries.push(ItineraryEntry {
                        day: entries.len() as u32 + 1,
                        band,
                        cost_units: Self::cost_units(choice.distance_km),
                        place: choice.clone(),
                    });
                }
            }
            rotation += 1;
        }

        if entries.is_empty() {
            debug!("Round-robin yielded nothing, falling back to the full place pool");
            return Self::positional_fallback(requested_days, pool);
        }
        entries
    }

    /// Take the nearest places from the sorted pool, one per day, with
    /// band labels derived from position rather than true distance.
    fn positional_fallback(requested_days: u32, pool: &[Place]) -> Vec<ItineraryEntry> {
        pool.iter()
            .take(requested_days as usize)
            .enumerate()
            .map(|(index, place)| ItineraryEntry {
                day: index as u32 + 1,
                band: DistanceBand::from_position(index),
                cost_units: Self::cost_units(place.distance_km),
                place: place.clone(),
            })
            .collect()
    }

    /// Placeholder economic model: flat base plus a distance surcharge
    #[must_use]
    pub fn cost_units(distance_km: f64) -> i64 {
        BASE_COST_UNITS + (distance_km * COST_UNITS_PER_KM).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExternalIds;
    use std::collections::HashMap;

    /// Bengaluru city center, used as the origin throughout
    const ORIGIN: Coordinate = Coordinate { lat: 12.9716, lon: 77.5946 };

    /// 1 degree of latitude is ~111.19 km; place a point at roughly the
    /// requested great-circle distance by offsetting latitude.
    fn coord_at_km(km: f64) -> Coordinate {
        Coordinate::new(ORIGIN.lat + km / 111.19, ORIGIN.lon)
    }

    fn record(name: &str, coordinate: Coordinate, tags: &[(&str, &str)]) -> RawPlaceRecord {
        let mut all_tags: HashMap<String, String> = tags
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        all_tags.insert("name".to_string(), name.to_string());
        RawPlaceRecord {
            tags: all_tags,
            lat: Some(coordinate.lat),
            lon: Some(coordinate.lon),
            center: None,
        }
    }

    fn place(name: &str, distance_km: f64, category: &str) -> Place {
        Place {
            name: name.to_string(),
            category: category.to_string(),
            coordinate: coord_at_km(distance_km),
            external_ids: ExternalIds::default(),
            distance_km,
        }
    }

    #[test]
    fn test_normalize_computes_distance_and_sorts() {
        let records = vec![
            record("Far Fort", coord_at_km(150.0), &[("historic", "fort")]),
            record("Near Park", coord_at_km(5.0), &[("leisure", "park")]),
        ];
        let places = ItineraryPlanner::normalize(ORIGIN, records);
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Near Park");
        assert!((places[0].distance_km - 5.0).abs() < 0.1);
        assert!((places[1].distance_km - 150.0).abs() < 0.5);
    }

    #[test]
    fn test_normalize_drops_nameless_and_coordinateless_records() {
        let mut nameless = record("x", coord_at_km(5.0), &[]);
        nameless.tags.remove("name");
        let mut blank_name = record("   ", coord_at_km(5.0), &[]);
        blank_name.tags.insert("name".to_string(), "   ".to_string());

        let mut no_coords = record("No Coords", coord_at_km(5.0), &[]);
        no_coords.lat = None;
        no_coords.lon = None;

        let mut zero_coords = record("Null Island", Coordinate::new(0.0, 0.0), &[]);
        zero_coords.center = None;

        let places = ItineraryPlanner::normalize(
            ORIGIN,
            vec![nameless, blank_name, no_coords, zero_coords],
        );
        assert!(places.is_empty());
    }

    #[test]
    fn test_normalize_uses_center_for_area_records() {
        let mut area = record("Palace Grounds", coord_at_km(8.0), &[("tourism", "attraction")]);
        let center = coord_at_km(8.0);
        area.lat = None;
        area.lon = None;
        area.center = Some(crate::models::CenterCoordinate {
            lat: center.lat,
            lon: center.lon,
        });

        let places = ItineraryPlanner::normalize(ORIGIN, vec![area]);
        assert_eq!(places.len(), 1);
        assert!((places[0].distance_km - 8.0).abs() < 0.1);
    }

    #[test]
    fn test_normalize_category_priority() {
        let both = record(
            "Tagged Twice",
            coord_at_km(3.0),
            &[("historic", "fort"), ("tourism", "attraction")],
        );
        let places = ItineraryPlanner::normalize(ORIGIN, vec![both]);
        // tourism outranks historic in the tag priority order
        assert_eq!(places[0].category, "attraction");
    }

    #[test]
    fn test_notability_by_external_id_and_category() {
        let mut plain = place("Plain", 5.0, "guest_house");
        assert!(!ItineraryPlanner::is_notable(&plain));

        plain.external_ids.wikidata = Some("Q100".to_string());
        assert!(ItineraryPlanner::is_notable(&plain));

        assert!(ItineraryPlanner::is_notable(&place("M", 5.0, "museum")));
        assert!(ItineraryPlanner::is_notable(&place("T", 5.0, "Hindu Temple")));
        assert!(ItineraryPlanner::is_notable(&place("H", 5.0, "HERITAGE site")));
        assert!(!ItineraryPlanner::is_notable(&place("P", 5.0, "park")));
    }

    #[test]
    fn test_ranked_bands_cap_and_order() {
        let mut places: Vec<Place> = (0..6)
            .map(|i| place(&format!("Ordinary {i}"), 1.0 + f64::from(i), "park"))
            .collect();
        places.push(place("Famous Far", 9.0, "museum"));
        places.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        let ranked = ItineraryPlanner::ranked_bands(&places);
        let near = &ranked[&DistanceBand::Near];
        assert_eq!(near.len(), MAX_BAND_SIZE);
        // the notable place leads despite being the farthest
        assert_eq!(near[0].name, "Famous Far");
        // remaining slots are nearest-first
        assert_eq!(near[1].name, "Ordinary 0");
        assert_eq!(near[2].name, "Ordinary 1");
        assert_eq!(near[3].name, "Ordinary 2");
    }

    #[test]
    fn test_ranked_bands_exclude_beyond_outermost() {
        let places = vec![place("Too Far", 400.0, "museum")];
        let ranked = ItineraryPlanner::ranked_bands(&places);
        assert!(ranked.values().all(Vec::is_empty));
    }

    #[test]
    fn test_plan_round_robins_across_bands() {
        let records = vec![
            record("City Museum", coord_at_km(5.0), &[("tourism", "museum")]),
            record("Hill Station", coord_at_km(50.0), &[("tourism", "attraction")]),
            record("Old Temple", coord_at_km(150.0), &[("historic", "temple")]),
            record("Distant Beach", coord_at_km(400.0), &[("tourism", "beach")]),
        ];
        let plan = ItineraryPlanner::plan(ORIGIN, 3, records);

        assert_eq!(plan.entries.len(), 3);
        assert_eq!(
            plan.entries.iter().map(|e| e.day).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(plan.entries[0].band, DistanceBand::Near);
        assert_eq!(plan.entries[0].place.name, "City Museum");
        assert_eq!(plan.entries[1].band, DistanceBand::Mid);
        assert_eq!(plan.entries[1].place.name, "Hill Station");
        assert_eq!(plan.entries[2].band, DistanceBand::Far);
        assert_eq!(plan.entries[2].place.name, "Old Temple");

        // the 400 km point is out of every band
        assert!(
            plan.band_summaries
                .values()
                .flatten()
                .all(|s| s.name != "Distant Beach")
        );
    }

    #[test]
    fn test_plan_never_repeats_a_place() {
        let records = vec![
            record("Only Museum", coord_at_km(5.0), &[("tourism", "museum")]),
            record("Only Park", coord_at_km(7.0), &[("leisure", "park")]),
        ];
        let plan = ItineraryPlanner::plan(ORIGIN, 10, records);

        // both candidates sit in the Near band; once they are used the
        // rotation is exhausted and the plan stops short of 10 days
        assert_eq!(plan.entries.len(), 2);
        let names: HashSet<_> = plan.entries.iter().map(|e| e.place.name.clone()).collect();
        assert_eq!(names.len(), plan.entries.len());
    }

    #[test]
    fn test_plan_fallback_when_all_bands_empty() {
        let records: Vec<RawPlaceRecord> = (0..5)
            .map(|i| {
                record(
                    &format!("Remote {i}"),
                    coord_at_km(350.0 + f64::from(i) * 10.0),
                    &[("tourism", "attraction")],
                )
            })
            .collect();
        let plan = ItineraryPlanner::plan(ORIGIN, 4, records);

        assert_eq!(plan.entries.len(), 4);
        // positional band labels: three per level
        assert_eq!(plan.entries[0].band, DistanceBand::Near);
        assert_eq!(plan.entries[2].band, DistanceBand::Near);
        assert_eq!(plan.entries[3].band, DistanceBand::Mid);
        // nearest-first out of the fallback pool
        assert_eq!(plan.entries[0].place.name, "Remote 0");
    }

    #[test]
    fn test_plan_empty_input_is_success_shaped() {
        let plan = ItineraryPlanner::plan(ORIGIN, 3, Vec::new());
        assert!(plan.entries.is_empty());
        assert_eq!(plan.total_cost_units, 0);
        assert_eq!(plan.start_date, plan.end_date);
        assert_eq!(plan.band_summaries.len(), 3);
        assert!(plan.band_summaries.values().all(Vec::is_empty));
    }

    #[test]
    fn test_cost_model() {
        assert_eq!(ItineraryPlanner::cost_units(0.0), 300);
        assert_eq!(ItineraryPlanner::cost_units(5.0), 350);
        assert_eq!(ItineraryPlanner::cost_units(150.04), 1800);
        assert_eq!(ItineraryPlanner::cost_units(150.06), 1801);
    }

    #[test]
    fn test_plan_totals_and_dates() {
        let records = vec![
            record("A", coord_at_km(5.0), &[("tourism", "museum")]),
            record("B", coord_at_km(50.0), &[("tourism", "museum")]),
        ];
        let plan = ItineraryPlanner::plan(ORIGIN, 2, records);

        let expected_total: i64 = plan.entries.iter().map(|e| e.cost_units).sum();
        assert_eq!(plan.total_cost_units, expected_total);
        for entry in &plan.entries {
            assert_eq!(
                entry.cost_units,
                ItineraryPlanner::cost_units(entry.place.distance_km)
            );
        }
        assert_eq!(
            plan.end_date,
            plan.start_date + chrono::Duration::days(plan.entries.len() as i64)
        );
    }

    #[test]
    fn test_band_summaries_keep_full_ranked_lists() {
        // 3 near places but only 1 requested day: summaries still show
        // the whole ranked band, not just the day actually used
        let records = vec![
            record("N1", coord_at_km(2.0), &[("leisure", "park")]),
            record("N2", coord_at_km(4.0), &[("leisure", "park")]),
            record("N3", coord_at_km(6.0), &[("leisure", "park")]),
        ];
        let plan = ItineraryPlanner::plan(ORIGIN, 1, records);
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.band_summaries[&DistanceBand::Near].len(), 3);
    }
}
