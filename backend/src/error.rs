use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Failure reported by the routing engine client.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("routing service is unavailable: {0}")]
    Unavailable(String),
    #[error("routing service timed out after {0:?}")]
    Timeout(Duration),
    #[error("routing failed: {0}")]
    NoRoute(String),
    #[error("routing service returned status {status}: {message}")]
    Upstream { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingErrorKind {
    Unavailable,
    Timeout,
    NoRoute,
    UpstreamError,
}

impl RoutingErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Timeout => "timeout",
            Self::NoRoute => "no-route",
            Self::UpstreamError => "upstream-error",
        }
    }
}

impl RoutingError {
    pub fn kind(&self) -> RoutingErrorKind {
        match self {
            Self::Unavailable(_) => RoutingErrorKind::Unavailable,
            Self::Timeout(_) => RoutingErrorKind::Timeout,
            Self::NoRoute(_) => RoutingErrorKind::NoRoute,
            Self::Upstream { .. } => RoutingErrorKind::UpstreamError,
        }
    }

    /// Whether the same request could succeed if sent again later.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Timeout(_) => true,
            Self::NoRoute(_) => false,
            Self::Upstream { status, .. } => *status >= 500,
        }
    }
}

/// Failure of the corridor candidate query.
#[derive(Debug, Error)]
pub enum CorridorError {
    #[error("corridor query failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corridor query timed out after {0:?}")]
    Timeout(Duration),
}

/// Request values outside the accepted bounds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("invalid coordinate ({lng}, {lat})")]
    InvalidCoordinate { lng: f64, lat: f64 },
    #[error("at least 2 waypoints required, got {0}")]
    TooFewWaypoints(usize),
}
