use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheAside, LookupError};
use crate::clients::UpstreamRequest;
use crate::config::CacheConfig;
use crate::db::Store;
use crate::entities::locations;
use crate::models::{Coordinates, Event, Location, NormalizeError, Weather};

/// The location a weather or events request is about.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationTarget {
    /// Present when the caller echoed back a location from `/location`.
    pub search_query: Option<String>,
    pub coordinates: Coordinates,
}

/// Serves the three lookups the API exposes.
///
/// Locations always go through the cache. Weather and events are fetched on
/// every request unless their cache is enabled and the target names a
/// location that is already stored.
pub struct LookupService {
    store: Store,
    cache: CacheAside,
    cache_config: CacheConfig,
}

impl LookupService {
    #[must_use]
    pub const fn new(store: Store, cache: CacheAside, cache_config: CacheConfig) -> Self {
        Self {
            store,
            cache,
            cache_config,
        }
    }

    pub async fn location(&self, query: &str) -> Result<Location, LookupError> {
        let request = UpstreamRequest::Geocode {
            address: query.to_string(),
        };

        let row = self
            .cache
            .lookup(&self.store.location_repo(), query, request, |raw| {
                Location::from_geocode(query, raw)
            })
            .await?;

        Ok(row.into())
    }

    pub async fn weather(&self, target: &LocationTarget) -> Result<Vec<Weather>, LookupError> {
        if self.cache_config.weather
            && let Some(location) = self.stored_location(target).await?
        {
            // Cached rows always describe the stored location's coordinates.
            let request = UpstreamRequest::Forecast(stored_coordinates(&location));
            let rows = self
                .cache
                .lookup(
                    &self.store.weather_repo(),
                    &location.id,
                    request,
                    Weather::from_forecast,
                )
                .await?;
            return Ok(rows.into_iter().map(Weather::from).collect());
        }

        let request = UpstreamRequest::Forecast(target.coordinates);
        self.fetch(&request, Weather::from_forecast).await
    }

    pub async fn events(&self, target: &LocationTarget) -> Result<Vec<Event>, LookupError> {
        if self.cache_config.events
            && let Some(location) = self.stored_location(target).await?
        {
            // Cached rows always describe the stored location's coordinates.
            let request = UpstreamRequest::Events(stored_coordinates(&location));
            let rows = self
                .cache
                .lookup(
                    &self.store.event_repo(),
                    &location.id,
                    request,
                    Event::from_search,
                )
                .await?;
            return Ok(rows.into_iter().map(Event::from).collect());
        }

        let request = UpstreamRequest::Events(target.coordinates);
        self.fetch(&request, Event::from_search).await
    }

    async fn fetch<R>(
        &self,
        request: &UpstreamRequest,
        normalize: fn(&Value) -> Result<R, NormalizeError>,
    ) -> Result<R, LookupError> {
        let raw = self.cache.upstream().fetch(request).await?;
        Ok(normalize(&raw)?)
    }

    async fn stored_location(
        &self,
        target: &LocationTarget,
    ) -> Result<Option<locations::Model>, LookupError> {
        let Some(query) = target.search_query.as_deref() else {
            return Ok(None);
        };

        let location = self.store.location_repo().find_by_query(query).await?;

        if location.is_none() {
            debug!(search_query = query, "No stored location, skipping cache");
        }

        Ok(location)
    }
}

const fn stored_coordinates(location: &locations::Model) -> Coordinates {
    Coordinates {
        latitude: location.latitude,
        longitude: location.longitude,
    }
}
