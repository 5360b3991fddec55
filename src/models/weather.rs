use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{NormalizeError, calendar_date};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    pub forecast: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Daily,
}

#[derive(Debug, Deserialize)]
struct Daily {
    #[serde(default)]
    data: Vec<DailyPoint>,
}

#[derive(Debug, Deserialize)]
struct DailyPoint {
    time: i64,
    #[serde(default)]
    summary: String,
}

impl Weather {
    /// One record per entry of `daily.data`, in upstream order.
    pub fn from_forecast(raw: &Value) -> Result<Vec<Self>, NormalizeError> {
        let response = ForecastResponse::deserialize(raw)?;

        response
            .daily
            .data
            .into_iter()
            .map(|day| {
                let instant = DateTime::from_timestamp(day.time, 0)
                    .ok_or(NormalizeError::InvalidTimestamp(day.time))?;
                Ok(Self {
                    forecast: day.summary,
                    time: calendar_date(instant),
                })
            })
            .collect()
    }
}
