//! HTTP API: request/response shapes and the trip-planning handler

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::post,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::models::{
    Coordinate, DistanceBand, ItineraryPlan, PlaceSummary, TRAVEL_MODE,
};
use crate::places::{PlaceSource, PlaceSourceError};
use crate::planner::ItineraryPlanner;

const DEFAULT_DAYS: u32 = 3;
const FASTEST_ROUTE: &str = "Land/ Road travel";

/// Shared handler state. The place source is injected so tests can
/// substitute a stub.
#[derive(Clone)]
pub struct AppState {
    pub place_source: Arc<dyn PlaceSource>,
}

/// Trip-planning request body. Coordinates and the day count are
/// accepted as JSON numbers or numeric strings; blank strings count as
/// absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTripRequest {
    #[serde(default)]
    pub start_place: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub days: Option<u32>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Marker coordinates for one ranked place
#[derive(Debug, Serialize, PartialEq)]
pub struct LevelPlace {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub dist: f64,
}

/// Ranked band contents for map display
#[derive(Debug, Serialize)]
pub struct Levels {
    pub level1: Vec<LevelPlace>,
    pub level2: Vec<LevelPlace>,
    pub level3: Vec<LevelPlace>,
}

/// One itinerary day as rendered to the client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub day: u32,
    pub level: &'static str,
    pub place: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub kinds: String,
    pub info: String,
    pub distance_km: f64,
    pub travel_mode: &'static str,
    pub weather: &'static str,
    pub cost: i64,
}

/// Successful planning response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTripResponse {
    pub success: bool,
    pub start_place: String,
    pub start_coords: Coordinate,
    pub total_days: u32,
    pub days: u32,
    pub total_cost: i64,
    pub start_date: String,
    pub end_date: String,
    pub fastest_route: &'static str,
    pub levels: Levels,
    pub itinerary: Vec<ItineraryDay>,
}

/// Structured failure result; never a thrown fault
#[derive(Debug, Serialize)]
pub struct PlanTripFailure {
    pub success: bool,
    pub message: String,
}

impl PlanTripFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Either outcome of a planning request, serialized flat
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlanTripResult {
    Planned(Box<PlanTripResponse>),
    Rejected(PlanTripFailure),
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/plan-trip", post(plan_trip))
        // legacy alias kept for older clients
        .route("/plan", post(plan_trip))
        .with_state(state)
}

async fn plan_trip(
    State(state): State<AppState>,
    Json(request): Json<PlanTripRequest>,
) -> Json<PlanTripResult> {
    Json(handle_plan_trip(state.place_source.as_ref(), request).await)
}

/// Core request handling, separated from the axum plumbing for testing.
pub async fn handle_plan_trip(
    place_source: &dyn PlaceSource,
    request: PlanTripRequest,
) -> PlanTripResult {
    let days = request.days.filter(|d| *d >= 1).unwrap_or(DEFAULT_DAYS);

    let (origin, start_place) = match resolve_start(place_source, &request).await {
        Ok(resolved) => resolved,
        Err(failure) => return PlanTripResult::Rejected(failure),
    };

    info!(
        "Planning {days}-day trip from {start_place} ({}, {})",
        origin.lat, origin.lon
    );

    let records = match place_source.fetch_nearby(origin).await {
        Ok(records) => records,
        Err(e) => {
            warn!("Place fetch failed: {e}");
            return PlanTripResult::Rejected(PlanTripFailure::new(format!(
                "Failed to fetch places from Overpass API: {e}"
            )));
        }
    };

    let plan = ItineraryPlanner::plan(origin, days, records);
    PlanTripResult::Planned(Box::new(build_response(start_place, &plan)))
}

/// Resolution order: explicit coordinates win; otherwise geocode the
/// free-text start place; otherwise the request is unusable.
async fn resolve_start(
    place_source: &dyn PlaceSource,
    request: &PlanTripRequest,
) -> Result<(Coordinate, String), PlanTripFailure> {
    if let (Some(lat), Some(lon)) = (request.lat, request.lon) {
        let origin = Coordinate::new(lat, lon);
        if origin.is_valid() {
            let label = request
                .start_place
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Current Location".to_string());
            return Ok((origin, label));
        }
    }

    if let Some(name) = request
        .start_place
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return match place_source.resolve_by_name(name).await {
            Ok(origin) => Ok((origin, name.to_string())),
            Err(PlaceSourceError::NotFound(_)) => {
                Err(PlanTripFailure::new("Start place not found"))
            }
            Err(e) => Err(PlanTripFailure::new(format!("Geocoding failed: {e}"))),
        };
    }

    Err(PlanTripFailure::new("Provide startPlace or lat & lon"))
}

fn build_response(start_place: String, plan: &ItineraryPlan) -> PlanTripResponse {
    let total_days = plan.entries.len() as u32;

    let level = |band: DistanceBand| -> Vec<LevelPlace> {
        plan.band_summaries
            .get(&band)
            .map(|summaries| summaries.iter().map(level_place).collect())
            .unwrap_or_default()
    };

    let itinerary = plan
        .entries
        .iter()
        .map(|entry| ItineraryDay {
            day: entry.day,
            level: entry.band.label(),
            place: entry.place.name.clone(),
            name: entry.place.name.clone(),
            lat: entry.place.coordinate.lat,
            lon: entry.place.coordinate.lon,
            kinds: entry.place.category.clone(),
            info: format!("{:.2} km away", entry.place.distance_km),
            distance_km: round2(entry.place.distance_km),
            travel_mode: TRAVEL_MODE,
            weather: "N/A",
            cost: entry.cost_units,
        })
        .collect();

    PlanTripResponse {
        success: true,
        start_place,
        start_coords: plan.origin,
        total_days,
        days: total_days,
        total_cost: plan.total_cost_units,
        start_date: plan.start_date.format("%a %b %d %Y").to_string(),
        end_date: plan.end_date.format("%a %b %d %Y").to_string(),
        fastest_route: FASTEST_ROUTE,
        levels: Levels {
            level1: level(DistanceBand::Near),
            level2: level(DistanceBand::Mid),
            level3: level(DistanceBand::Far),
        },
        itinerary,
    }
}

fn level_place(summary: &PlaceSummary) -> LevelPlace {
    LevelPlace {
        name: summary.name.clone(),
        lat: summary.coordinate.lat,
        lon: summary.coordinate.lon,
        dist: round2(summary.distance_km),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
