//! Nominatim forward-geocoding client

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::error::{PlaceSourceError, Result};
use crate::config::WayfarerConfig;
use crate::models::Coordinate;

/// Forward geocoder resolving free-text place names into coordinates.
/// Single lookup, no retry.
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

/// One match from the Nominatim search endpoint. Coordinates come back
/// as strings.
#[derive(Debug, Deserialize)]
struct NominatimMatch {
    lat: String,
    lon: String,
}

impl NominatimClient {
    /// Create a new client. Nominatim requires a `User-Agent` header.
    pub fn new(config: &WayfarerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(
                config.geocoding.timeout_seconds,
            )))
            .user_agent(concat!("Wayfarer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.geocoding.base_url.clone(),
        })
    }

    /// Resolve a place name to the best-matching coordinate.
    pub async fn resolve(&self, text: &str) -> Result<Coordinate> {
        debug!("Geocoding place name: {text}");

        let url = format!(
            "{}/search?q={}&format=json&limit=1&addressdetails=0",
            self.base_url,
            urlencoding::encode(text)
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            PlaceSourceError::UpstreamUnavailable(format!("geocoding request failed: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(PlaceSourceError::UpstreamUnavailable(format!(
                "geocoding service returned status {}",
                response.status()
            )));
        }

        let matches: Vec<NominatimMatch> = response.json().await.map_err(|e| {
            PlaceSourceError::UpstreamUnavailable(format!("undecodable geocoding body: {e}"))
        })?;

        let best = matches
            .into_iter()
            .next()
            .ok_or_else(|| PlaceSourceError::NotFound(text.to_string()))?;

        let coordinate = parse_match(&best)?;
        debug!(
            "Geocoded \"{text}\" to ({:.4}, {:.4})",
            coordinate.lat, coordinate.lon
        );
        Ok(coordinate)
    }
}

fn parse_match(result: &NominatimMatch) -> Result<Coordinate> {
    let lat: f64 = result.lat.parse().map_err(|_| {
        PlaceSourceError::UpstreamUnavailable(format!("unparseable latitude: {}", result.lat))
    })?;
    let lon: f64 = result.lon.parse().map_err(|_| {
        PlaceSourceError::UpstreamUnavailable(format!("unparseable longitude: {}", result.lon))
    })?;

    let coordinate = Coordinate::new(lat, lon);
    if !coordinate.is_valid() {
        return Err(PlaceSourceError::UpstreamUnavailable(format!(
            "geocoder returned out-of-range coordinate ({lat}, {lon})"
        )));
    }
    Ok(coordinate)
}
