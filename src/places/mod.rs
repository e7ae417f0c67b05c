//! Place source module
//!
//! This module abstracts "fetch raw points of interest near a coordinate"
//! behind a narrow trait, with:
//! - An Overpass-backed query client with primary/mirror fallback
//! - A Nominatim-backed forward geocoder for free-text place names
//! - Coordinate-keyed TTL caching of query results

pub mod error;
pub mod nominatim;
pub mod overpass;

// Re-export commonly used types from submodules
pub use error::{PlaceSourceError, Result};
pub use nominatim::NominatimClient;
pub use overpass::OverpassClient;

use crate::cache::TtlCache;
use crate::config::WayfarerConfig;
use crate::models::{Coordinate, RawPlaceRecord};
use async_trait::async_trait;

/// Narrow contract the planner's callers consume place data through.
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Fetch raw points of interest within the configured radius of
    /// `origin`. Fails with `UpstreamUnavailable` or `MalformedResponse`.
    async fn fetch_nearby(&self, origin: Coordinate) -> Result<Vec<RawPlaceRecord>>;

    /// Resolve a free-text place name into a coordinate. Fails with
    /// `NotFound` when there is no match, `UpstreamUnavailable` on
    /// transport errors.
    async fn resolve_by_name(&self, text: &str) -> Result<Coordinate>;
}

/// Production [`PlaceSource`] composed of the Overpass query client and
/// the Nominatim geocoder.
pub struct OsmPlaceSource {
    overpass: OverpassClient,
    nominatim: NominatimClient,
}

impl OsmPlaceSource {
    /// Build the place source from configuration, with an injected cache.
    pub fn new(config: &WayfarerConfig, cache: TtlCache) -> anyhow::Result<Self> {
        Ok(Self {
            overpass: OverpassClient::new(config, cache)?,
            nominatim: NominatimClient::new(config)?,
        })
    }
}

#[async_trait]
impl PlaceSource for OsmPlaceSource {
    async fn fetch_nearby(&self, origin: Coordinate) -> Result<Vec<RawPlaceRecord>> {
        self.overpass.fetch_nearby(origin).await
    }

    async fn resolve_by_name(&self, text: &str) -> Result<Coordinate> {
        self.nominatim.resolve(text).await
    }
}
