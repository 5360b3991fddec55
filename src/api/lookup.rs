use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Event, Location, Weather};
use crate::state::AppState;

use super::ApiError;
use super::error::Resource;
use super::validation::{parse_location_target, validate_search_query};

type Params = Result<Query<HashMap<String, String>>, QueryRejection>;

fn params(resource: Resource, params: Params) -> Result<HashMap<String, String>, ApiError> {
    params
        .map(|Query(p)| p)
        .map_err(|e| ApiError::invalid_query(resource, e.body_text()))
}

pub async fn get_location(
    State(state): State<Arc<AppState>>,
    query: Params,
) -> Result<Json<Location>, ApiError> {
    let params = params(Resource::Location, query)?;
    let search_query = validate_search_query(&params)
        .map_err(|e| ApiError::invalid_query(Resource::Location, e))?;

    let location = state
        .lookup
        .location(search_query)
        .await
        .map_err(|e| ApiError::lookup(Resource::Location, e))?;

    Ok(Json(location))
}

pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    query: Params,
) -> Result<Json<Vec<Weather>>, ApiError> {
    let params = params(Resource::Weather, query)?;
    let target = parse_location_target(&params)
        .map_err(|e| ApiError::invalid_query(Resource::Weather, e))?;

    let days = state
        .lookup
        .weather(&target)
        .await
        .map_err(|e| ApiError::lookup(Resource::Weather, e))?;

    Ok(Json(days))
}

pub async fn get_events(
    State(state): State<Arc<AppState>>,
    query: Params,
) -> Result<Json<Vec<Event>>, ApiError> {
    let params = params(Resource::Events, query)?;
    let target = parse_location_target(&params)
        .map_err(|e| ApiError::invalid_query(Resource::Events, e))?;

    let events = state
        .lookup
        .events(&target)
        .await
        .map_err(|e| ApiError::lookup(Resource::Events, e))?;

    Ok(Json(events))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
