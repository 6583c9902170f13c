//! Shared fixtures for the cross-crate test suites.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use vista_core::geo::distance_km;
use vista_core::{Coordinate, RouteGeometry, RoutingError, RoutingService};

pub const UNREACHABLE_OSRM_URL: &str = "http://127.0.0.1:9";
pub const POINTS_PER_LEG: usize = 60;

pub fn bundled_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../catalog/jeju_pois.json")
}

/// Straight-line router. Fails the first `failures` calls.
#[derive(Debug, Default)]
pub struct LineRouter {
    failures: usize,
    calls: AtomicUsize,
}

impl LineRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RoutingService for LineRouter {
    async fn route(&self, coordinates: &[Coordinate]) -> Result<RouteGeometry, RoutingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(RoutingError::Status("NoRoute".to_string()));
        }
        if coordinates.len() < 2 {
            return Err(RoutingError::TooFewCoordinates(coordinates.len()));
        }
        Ok(line_geometry(coordinates))
    }
}

pub fn line_geometry(stops: &[Coordinate]) -> RouteGeometry {
    let mut points = Vec::with_capacity(stops.len() * POINTS_PER_LEG + 1);
    for leg in stops.windows(2) {
        for step in 0..POINTS_PER_LEG {
            let t = step as f64 / POINTS_PER_LEG as f64;
            points.push(Coordinate::new_unchecked(
                leg[0].lon + (leg[1].lon - leg[0].lon) * t,
                leg[0].lat + (leg[1].lat - leg[0].lat) * t,
            ));
        }
    }
    points.extend(stops.last().copied());

    let distance_meters = stops
        .windows(2)
        .map(|leg| distance_km(leg[0], leg[1]) * 1000.0)
        .sum::<f64>();

    RouteGeometry {
        coordinates: points,
        distance_meters,
        duration_seconds: distance_meters / 14.0,
    }
}
