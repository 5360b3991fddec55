//! Client for the three third-party APIs: geocoding, weather forecast and
//! event search.
//!
//! Every call is a single GET. There are no retries; a failure is returned
//! to the caller as an [`UpstreamError`].

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::{Config, UpstreamConfig};
use crate::models::Coordinates;

const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: Service,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{service} returned invalid JSON: {source}")]
    Decode {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid {service} URL: {source}")]
    Url {
        service: Service,
        #[source]
        source: url::ParseError,
    },
}

/// Which third-party API a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Geocode,
    Weather,
    Events,
}

impl Service {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Geocode => "geocode",
            Self::Weather => "weather",
            Self::Events => "events",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to one of the upstream APIs.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamRequest {
    Geocode { address: String },
    Forecast(Coordinates),
    Events(Coordinates),
}

impl UpstreamRequest {
    #[must_use]
    pub const fn service(&self) -> Service {
        match self {
            Self::Geocode { .. } => Service::Geocode,
            Self::Forecast(_) => Service::Weather,
            Self::Events(_) => Service::Events,
        }
    }

    /// Builds the full request URL, credentials included.
    pub fn url(&self, config: &Config) -> Result<Url, UpstreamError> {
        let service = self.service();
        let wrap = |source| UpstreamError::Url { service, source };

        match self {
            Self::Geocode { address } => {
                let mut url = Url::parse(&config.geocode.base_url).map_err(wrap)?;
                url.query_pairs_mut()
                    .append_pair("address", address)
                    .append_pair("key", &config.geocode.api_key);
                Ok(url)
            }
            Self::Forecast(coords) => {
                let base = with_trailing_slash(&config.weather);
                let path = format!(
                    "{}/{},{}",
                    config.weather.api_key, coords.latitude, coords.longitude
                );
                Url::parse(&base).and_then(|b| b.join(&path)).map_err(wrap)
            }
            Self::Events(coords) => {
                let mut url = Url::parse(&config.events.base_url).map_err(wrap)?;
                url.query_pairs_mut()
                    .append_pair("location.latitude", &coords.latitude.to_string())
                    .append_pair("location.longitude", &coords.longitude.to_string())
                    .append_pair("token", &config.events.api_key);
                Ok(url)
            }
        }
    }
}

fn with_trailing_slash(upstream: &UpstreamConfig) -> String {
    if upstream.base_url.ends_with('/') {
        upstream.base_url.clone()
    } else {
        format!("{}/", upstream.base_url)
    }
}

/// Build the HTTP client shared by all upstream calls.
pub fn build_http_client(config: &Config) -> anyhow::Result<Client> {
    let mut builder = Client::builder()
        .user_agent(config.http.user_agent.clone())
        .pool_max_idle_per_host(10);

    if config.http.request_timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(config.http.request_timeout_seconds));
    }

    builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))
}

#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    config: Config,
}

impl UpstreamClient {
    #[must_use]
    pub const fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    /// Performs the request and returns the parsed JSON body.
    pub async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError> {
        let service = request.service();
        let result = self.send(request).await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!(
            "upstream_requests_total",
            "service" => service.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        result
    }

    async fn send(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError> {
        let service = request.service();
        let url = request.url(&self.config)?;

        debug!(service = %service, "Fetching upstream data");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { service, source })?;

        if !response.status().is_success() {
            let status = response.status();
            let mut body = response.text().await.unwrap_or_default();
            truncate(&mut body, MAX_ERROR_BODY);
            return Err(UpstreamError::Status {
                service,
                status,
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|source| UpstreamError::Decode { service, source })
    }
}

fn truncate(text: &mut String, max: usize) {
    if text.len() > max {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.geocode.api_key = "geo-key".to_string();
        config.weather.api_key = "sky-key".to_string();
        config.events.api_key = "event-key".to_string();
        config
    }

    const SEATTLE: Coordinates = Coordinates {
        latitude: 47.6062,
        longitude: -122.3321,
    };

    #[test]
    fn test_geocode_url() {
        let request = UpstreamRequest::Geocode {
            address: "seattle wa".to_string(),
        };
        let url = request.url(&config()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json?address=seattle+wa&key=geo-key"
        );
    }

    #[test]
    fn test_forecast_url() {
        let url = UpstreamRequest::Forecast(SEATTLE).url(&config()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.darksky.net/forecast/sky-key/47.6062,-122.3321"
        );
    }

    #[test]
    fn test_forecast_url_with_trailing_slash_base() {
        let mut config = config();
        config.weather.base_url = "http://127.0.0.1:9000/forecast/".to_string();
        let url = UpstreamRequest::Forecast(SEATTLE).url(&config).unwrap();
        assert_eq!(url.path(), "/forecast/sky-key/47.6062,-122.3321");
    }

    #[test]
    fn test_events_url() {
        let url = UpstreamRequest::Events(SEATTLE).url(&config()).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.path(), "/v3/events/search");
        assert_eq!(
            pairs,
            vec![
                ("location.latitude".to_string(), "47.6062".to_string()),
                ("location.longitude".to_string(), "-122.3321".to_string()),
                ("token".to_string(), "event-key".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = config();
        config.events.base_url = "not a url".to_string();
        let err = UpstreamRequest::Events(SEATTLE).url(&config).unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::Url {
                service: Service::Events,
                ..
            }
        ));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let mut text = "ééé".to_string();
        truncate(&mut text, 3);
        assert_eq!(text, "é");
    }
}
