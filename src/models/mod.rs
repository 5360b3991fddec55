//! Fixed-shape records served by the API and the normalizers that build them
//! from raw upstream payloads.

pub mod event;
pub mod location;
pub mod weather;

pub use event::Event;
pub use location::Location;
pub use weather::Weather;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to turn an upstream payload into records.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Unexpected upstream payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Upstream returned no results")]
    NoResults,

    #[error("Upstream reported status {0}")]
    UpstreamStatus(String),

    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(i64),

    #[error("Unparseable date '{0}'")]
    InvalidDate(String),
}

/// A point on the map, as passed to the weather and events APIs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Formats a UTC instant as `Www Mmm DD YYYY`, e.g. `Mon Oct 22 2018`.
#[must_use]
pub fn calendar_date(instant: DateTime<Utc>) -> String {
    instant.format("%a %b %d %Y").to_string()
}
