//! Overpass API client with primary/mirror fallback and TTL caching

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::{PlaceSourceError, Result};
use crate::cache::TtlCache;
use crate::config::WayfarerConfig;
use crate::models::{Coordinate, RawPlaceRecord};

/// Overpass interpreter client.
///
/// One fetch is at most two sequential upstream attempts: the primary
/// endpoint, then the mirror with identical parameters. Upstream behavior
/// is "works or doesn't", so there is no backoff between the attempts.
pub struct OverpassClient {
    client: Client,
    primary_url: String,
    mirror_url: String,
    radius_km: u32,
    cache: TtlCache,
    cache_ttl: Duration,
}

/// Overpass interpreter response body. Some deployments embed an `error`
/// payload inside a 2xx response instead of failing the request.
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<RawPlaceRecord>,
    error: Option<serde_json::Value>,
}

impl OverpassClient {
    /// Create a new client with an injected cache
    pub fn new(config: &WayfarerConfig, cache: TtlCache) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.overpass.timeout_seconds)))
            .user_agent(concat!("Wayfarer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            primary_url: config.overpass.primary_url.clone(),
            mirror_url: config.overpass.mirror_url.clone(),
            radius_km: config.overpass.radius_km,
            cache,
            cache_ttl: Duration::from_secs(config.cache.ttl_seconds),
        })
    }

    /// Fetch raw points of interest around `origin`.
    ///
    /// Consults the coordinate-keyed cache first; a hit returns without
    /// any network call. A successful upstream result set is cached for
    /// the configured TTL before being returned.
    pub async fn fetch_nearby(&self, origin: Coordinate) -> Result<Vec<RawPlaceRecord>> {
        let cache_key = origin.cache_key();

        match self.cache.get::<Vec<RawPlaceRecord>>(&cache_key).await {
            Ok(Some(cached)) => {
                debug!("Using cached Overpass data, count = {}", cached.len());
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!("Cache read failed, falling through to upstream: {e}"),
        }

        let query = self.build_query(origin);
        info!(
            "Querying Overpass for points of interest within {} km of ({}, {})",
            self.radius_km, origin.lat, origin.lon
        );

        let records = match self.attempt(&self.primary_url, &query).await {
            Ok(records) => records,
            Err(primary_err) => {
                warn!("Primary Overpass endpoint failed: {primary_err}, trying mirror");
                self.attempt(&self.mirror_url, &query)
                    .await
                    .map_err(|mirror_err| {
                        PlaceSourceError::UpstreamUnavailable(format!(
                            "primary: {primary_err}; mirror: {mirror_err}"
                        ))
                    })?
            }
        };

        info!("Overpass returned {} elements", records.len());

        if let Err(e) = self
            .cache
            .put(&cache_key, records.clone(), self.cache_ttl)
            .await
        {
            warn!("Failed to cache Overpass result: {e}");
        }

        Ok(records)
    }

    /// One upstream attempt against a single endpoint
    async fn attempt(&self, url: &str, query: &str) -> Result<Vec<RawPlaceRecord>> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| {
                PlaceSourceError::UpstreamUnavailable(format!("request to {url} failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(PlaceSourceError::UpstreamUnavailable(format!(
                "{url} returned status {}",
                response.status()
            )));
        }

        let body: OverpassResponse = response.json().await.map_err(|e| {
            PlaceSourceError::MalformedResponse(format!("undecodable Overpass body: {e}"))
        })?;

        if let Some(error) = body.error {
            return Err(PlaceSourceError::MalformedResponse(format!(
                "Overpass error payload: {error}"
            )));
        }

        Ok(body.elements)
    }

    /// Build the bounded-radius query for tourism, historic sites, parks
    /// and viewpoints, asking for centroids on area-shaped results.
    fn build_query(&self, origin: Coordinate) -> String {
        let radius_m = u64::from(self.radius_km) * 1000;
        let (lat, lon) = (origin.lat, origin.lon);
        format!(
            r#"[out:json][timeout:25];
(
  node["tourism"](around:{radius_m},{lat},{lon});
  way["tourism"](around:{radius_m},{lat},{lon});
  relation["tourism"](around:{radius_m},{lat},{lon});
  node["historic"](around:{radius_m},{lat},{lon});
  node["leisure"="park"](around:{radius_m},{lat},{lon});
  node["amenity"="viewpoint"](around:{radius_m},{lat},{lon});
);
out center;"#
        )
    }
}
