use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::NormalizeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub search_query: String,
    pub formatted_query: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl Location {
    /// Builds a location from the first result of a geocoding response.
    pub fn from_geocode(query: &str, raw: &Value) -> Result<Self, NormalizeError> {
        let response = GeocodeResponse::deserialize(raw)?;

        if let Some(status) = response.status
            && status != "OK"
            && status != "ZERO_RESULTS"
        {
            return Err(NormalizeError::UpstreamStatus(status));
        }

        let first = response
            .results
            .into_iter()
            .next()
            .ok_or(NormalizeError::NoResults)?;

        Ok(Self {
            search_query: query.to_string(),
            formatted_query: first.formatted_address,
            latitude: first.geometry.location.lat,
            longitude: first.geometry.location.lng,
        })
    }
}
