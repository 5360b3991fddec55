//! Parsing of the `data` query parameter.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::Coordinates;
use crate::services::LocationTarget;

pub const DATA_PARAM: &str = "data";

/// The address text for `/location`. Returned untrimmed, since it is the
/// cache key and is echoed back as `search_query`.
pub fn validate_search_query(params: &HashMap<String, String>) -> Result<&str, String> {
    let query = params
        .get(DATA_PARAM)
        .ok_or_else(|| "Missing 'data' parameter".to_string())?;

    if query.trim().is_empty() {
        return Err("Search query cannot be empty".to_string());
    }

    Ok(query)
}

/// Reads a location from `data` sent as a JSON object, from bracketed
/// `data[field]` parameters, or from top-level `latitude`/`longitude`.
pub fn parse_location_target(params: &HashMap<String, String>) -> Result<LocationTarget, String> {
    if let Some(data) = params.get(DATA_PARAM) {
        let value: Value = serde_json::from_str(data)
            .map_err(|_| format!("'data' is not a location object: {data}"))?;
        return target_from_json(&value);
    }

    let bracketed = |field: &str| params.get(&format!("{DATA_PARAM}[{field}]"));
    if bracketed("latitude").is_some() || bracketed("longitude").is_some() {
        return target_from_fields(
            bracketed("latitude").map(String::as_str),
            bracketed("longitude").map(String::as_str),
            bracketed("search_query").cloned(),
        );
    }

    target_from_fields(
        params.get("latitude").map(String::as_str),
        params.get("longitude").map(String::as_str),
        params.get("search_query").cloned(),
    )
}

fn target_from_json(value: &Value) -> Result<LocationTarget, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "'data' must be a JSON object".to_string())?;

    let number = |field: &str| -> Result<f64, String> {
        match object.get(field) {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| format!("'{field}' is not a number")),
            Some(Value::String(s)) => parse_number(field, s),
            Some(_) => Err(format!("'{field}' is not a number")),
            None => Err(format!("Missing '{field}'")),
        }
    };

    let coordinates = validate_coordinates(number("latitude")?, number("longitude")?)?;
    let search_query = object
        .get("search_query")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(LocationTarget {
        search_query,
        coordinates,
    })
}

fn target_from_fields(
    latitude: Option<&str>,
    longitude: Option<&str>,
    search_query: Option<String>,
) -> Result<LocationTarget, String> {
    let latitude = parse_number("latitude", latitude.ok_or("Missing 'latitude'")?)?;
    let longitude = parse_number("longitude", longitude.ok_or("Missing 'longitude'")?)?;

    Ok(LocationTarget {
        search_query,
        coordinates: validate_coordinates(latitude, longitude)?,
    })
}

fn parse_number(field: &str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("'{field}' is not a number: {raw}"))
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<Coordinates, String> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("Latitude out of range: {latitude}"));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("Longitude out of range: {longitude}"));
    }

    Ok(Coordinates {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_search_query_kept_verbatim() {
        let p = params(&[("data", " Lynnwood ")]);
        assert_eq!(validate_search_query(&p).unwrap(), " Lynnwood ");
    }

    #[test]
    fn test_search_query_missing_or_blank() {
        assert!(validate_search_query(&params(&[])).is_err());
        assert!(validate_search_query(&params(&[("data", "  ")])).is_err());
    }

    #[test]
    fn test_target_from_json_object() {
        let p = params(&[(
            "data",
            r#"{"search_query":"seattle","formatted_query":"Seattle, WA, USA","latitude":47.6062,"longitude":-122.3321}"#,
        )]);
        let target = parse_location_target(&p).unwrap();
        assert_eq!(target.search_query.as_deref(), Some("seattle"));
        assert_eq!(target.coordinates.latitude, 47.6062);
        assert_eq!(target.coordinates.longitude, -122.3321);
    }

    #[test]
    fn test_target_from_json_string_numbers() {
        let p = params(&[("data", r#"{"latitude":"47.6","longitude":"-122.3"}"#)]);
        let target = parse_location_target(&p).unwrap();
        assert_eq!(target.search_query, None);
        assert_eq!(target.coordinates.latitude, 47.6);
    }

    #[test]
    fn test_target_from_bracketed_fields() {
        let p = params(&[
            ("data[search_query]", "lynnwood"),
            ("data[latitude]", "47.82"),
            ("data[longitude]", "-122.31"),
        ]);
        let target = parse_location_target(&p).unwrap();
        assert_eq!(target.search_query.as_deref(), Some("lynnwood"));
        assert_eq!(target.coordinates.longitude, -122.31);
    }

    #[test]
    fn test_target_from_top_level_fields() {
        let p = params(&[("latitude", "10"), ("longitude", "20")]);
        let target = parse_location_target(&p).unwrap();
        assert_eq!(
            target.coordinates,
            Coordinates {
                latitude: 10.0,
                longitude: 20.0
            }
        );
    }

    #[test]
    fn test_plain_string_data_is_rejected() {
        let p = params(&[("data", "seattle")]);
        assert!(parse_location_target(&p).is_err());
    }

    #[test]
    fn test_missing_longitude_is_rejected() {
        let p = params(&[("data[latitude]", "47.82")]);
        assert_eq!(
            parse_location_target(&p).unwrap_err(),
            "Missing 'longitude'"
        );
    }

    #[test]
    fn test_out_of_range_and_nan_rejected() {
        assert!(parse_location_target(&params(&[("latitude", "91"), ("longitude", "0")])).is_err());
        assert!(parse_location_target(&params(&[("latitude", "NaN"), ("longitude", "0")])).is_err());
    }
}
