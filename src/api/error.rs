use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::cache::LookupError;

pub const NOT_FOUND_MESSAGE: &str = "you got to the wrong place";

/// What a failed request was asking for. Each resource has one fixed message
/// that is all a client ever sees of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Location,
    Weather,
    Events,
}

impl Resource {
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Location => "Status: 500. So sorry, something went wrong getting the location.",
            Self::Weather => "Status: 500. Something went wrong getting the weather.",
            Self::Events => "Status: 500. Something went wrong getting the events.",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Weather => "weather",
            Self::Events => "events",
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,

    Lookup {
        resource: Resource,
        source: LookupError,
    },

    InvalidQuery {
        resource: Resource,
        message: String,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::Lookup { resource, source } => {
                write!(f, "{} lookup failed: {}", resource.as_str(), source)
            }
            ApiError::InvalidQuery { resource, message } => {
                write!(f, "Invalid {} query: {}", resource.as_str(), message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let resource = match &self {
            ApiError::NotFound => {
                return (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE).into_response();
            }
            ApiError::Lookup { resource, source } => {
                tracing::error!(resource = resource.as_str(), error = %source, "Lookup failed");
                *resource
            }
            ApiError::InvalidQuery { resource, message } => {
                tracing::error!(resource = resource.as_str(), error = %message, "Invalid query");
                *resource
            }
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            resource.failure_message(),
        )
            .into_response()
    }
}

impl ApiError {
    pub fn lookup(resource: Resource, source: LookupError) -> Self {
        ApiError::Lookup { resource, source }
    }

    pub fn invalid_query(resource: Resource, message: impl Into<String>) -> Self {
        ApiError::InvalidQuery {
            resource,
            message: message.into(),
        }
    }
}
