//! OSRM HTTP client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;
use vista_core::{Coordinate, RouteGeometry, RoutingError, RoutingService};

pub const DEFAULT_OSRM_URL: &str = "http://router.project-osrm.org";
pub const DEFAULT_PROFILE: &str = "driving";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout: Duration,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OSRM_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RoutingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("VISTA_OSRM_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.base_url);
        let timeout = std::env::var("VISTA_ROUTING_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            base_url,
            profile: defaults.profile,
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<Coordinate>,
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: Url,
    profile: String,
}

impl OsrmClient {
    pub fn new(config: RoutingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build routing http client")?;
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("invalid routing base url: {}", config.base_url))?;

        Ok(Self {
            client,
            base_url,
            profile: config.profile,
        })
    }

    /// `/route/v1/{profile}/{lon,lat;...}` with full GeoJSON overview and steps.
    pub fn route_url(&self, coordinates: &[Coordinate]) -> Result<Url, RoutingError> {
        let joined = coordinates
            .iter()
            .map(Coordinate::to_string)
            .collect::<Vec<_>>()
            .join(";");

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RoutingError::Transport(format!("base url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["route", "v1", self.profile.as_str(), joined.as_str()]);
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson")
            .append_pair("steps", "true");
        Ok(url)
    }
}

impl RoutingService for OsrmClient {
    #[instrument(skip(self, coordinates), fields(points = coordinates.len()))]
    async fn route(&self, coordinates: &[Coordinate]) -> Result<RouteGeometry, RoutingError> {
        if coordinates.len() < 2 {
            return Err(RoutingError::TooFewCoordinates(coordinates.len()));
        }

        let url = self.route_url(coordinates)?;
        debug!(%url, "requesting route");

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        match parse_route_response(&body) {
            Err(RoutingError::Transport(_)) if !status.is_success() => {
                warn!(%status, "routing service rejected request");
                Err(RoutingError::Status(status.to_string()))
            }
            other => other,
        }
    }
}

fn transport_error(err: reqwest::Error) -> RoutingError {
    if err.is_timeout() {
        RoutingError::Timeout
    } else {
        RoutingError::Transport(err.to_string())
    }
}

/// Extracts the first route from an OSRM JSON body.
pub fn parse_route_response(body: &str) -> Result<RouteGeometry, RoutingError> {
    let parsed: OsrmResponse = serde_json::from_str(body)
        .map_err(|err| RoutingError::Transport(format!("unreadable routing response: {err}")))?;

    if parsed.code != "Ok" {
        if let Some(message) = &parsed.message {
            debug!(code = %parsed.code, %message, "routing service reported failure");
        }
        return Err(RoutingError::Status(parsed.code));
    }

    let route = parsed.routes.into_iter().next().ok_or(RoutingError::NoRoute)?;
    Ok(RouteGeometry {
        coordinates: route.geometry.coordinates,
        distance_meters: route.distance,
        duration_seconds: route.duration,
    })
}
