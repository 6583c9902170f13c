use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("nearest-point search over an empty candidate list")]
    EmptyInput,
    #[error("coordinate out of range: lon={lon}, lat={lat}")]
    OutOfRange { lon: f64, lat: f64 },
}

/// Raised when the POI catalog cannot be built. Callers degrade to an empty catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog source unavailable: {0}")]
    Missing(String),
    #[error("catalog is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("duplicate POI name in catalog: {0}")]
    DuplicateName(String),
    #[error("POI {name} has invalid coordinates")]
    InvalidCoordinates { name: String },
}

/// Failure reported by a routing-service client for a single call.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing requires at least two coordinates, got {0}")]
    TooFewCoordinates(usize),
    #[error("routing service returned status {0}")]
    Status(String),
    #[error("routing service returned no routes")]
    NoRoute,
    #[error("routing transport failure: {0}")]
    Transport(String),
    #[error("routing call timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum RouteError {
    /// Both the primary and the direct fallback request failed.
    #[error("could not compute a route: primary failed ({primary}), fallback failed ({fallback})")]
    Unavailable {
        primary: RoutingError,
        fallback: RoutingError,
    },
}
