use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{NormalizeError, calendar_date};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub link: String,
    pub name: String,
    pub event_date: String,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
struct EventSearchResponse {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    url: String,
    name: TextField,
    start: EventStart,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<TextField>,
}

#[derive(Debug, Deserialize)]
struct TextField {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventStart {
    utc: String,
}

impl Event {
    /// One record per entry of `events`, in upstream order.
    pub fn from_search(raw: &Value) -> Result<Vec<Self>, NormalizeError> {
        let response = EventSearchResponse::deserialize(raw)?;

        response.events.into_iter().map(Self::from_raw).collect()
    }

    fn from_raw(raw: RawEvent) -> Result<Self, NormalizeError> {
        let start = DateTime::parse_from_rfc3339(&raw.start.utc)
            .map_err(|_| NormalizeError::InvalidDate(raw.start.utc.clone()))?
            .with_timezone(&Utc);

        let summary = raw
            .summary
            .or_else(|| raw.description.and_then(|d| d.text))
            .unwrap_or_default();

        Ok(Self {
            link: raw.url,
            name: raw.name.text.unwrap_or_default(),
            event_date: calendar_date(start),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_event(name: &str, utc: &str) -> Value {
        json!({
            "url": format!("https://www.eventbrite.com/e/{}", name.to_lowercase()),
            "name": { "text": name, "html": name },
            "start": { "timezone": "America/Los_Angeles", "local": "2018-10-22T19:00:00", "utc": utc },
            "summary": format!("{name} summary")
        })
    }

    #[test]
    fn test_from_search_preserves_order() {
        let raw = json!({
            "pagination": { "page_number": 1 },
            "events": [
                raw_event("Alpha", "2018-10-23T02:00:00Z"),
                raw_event("Beta", "2018-10-24T18:30:00Z"),
            ]
        });

        let events = Event::from_search(&raw).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "Alpha");
        assert_eq!(events[0].link, "https://www.eventbrite.com/e/alpha");
        // The UTC start wins over the local start.
        assert_eq!(events[0].event_date, "Tue Oct 23 2018");
        assert_eq!(events[1].name, "Beta");
        assert_eq!(events[1].event_date, "Wed Oct 24 2018");
        assert_eq!(events[1].summary, "Beta summary");
    }

    #[test]
    fn test_summary_falls_back_to_description() {
        let raw = json!({
            "events": [{
                "url": "https://example.com/e/1",
                "name": { "text": "Meetup" },
                "start": { "utc": "2019-01-01T00:00:00Z" },
                "description": { "text": "From the description" }
            }]
        });

        let events = Event::from_search(&raw).unwrap();
        assert_eq!(events[0].summary, "From the description");
        assert_eq!(events[0].event_date, "Tue Jan 01 2019");
    }

    #[test]
    fn test_invalid_start_date() {
        let raw = json!({ "events": [raw_event("Broken", "next tuesday")] });
        let err = Event::from_search(&raw).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidDate(d) if d == "next tuesday"));
    }

    #[test]
    fn test_no_events() {
        assert!(Event::from_search(&json!({ "events": [] })).unwrap().is_empty());
    }
}
