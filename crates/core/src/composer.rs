//! Turns a [`RoutePlan`] into road geometry through a routing service.

use tracing::{debug, info, instrument, warn};

use crate::catalog::PoiStore;
use crate::error::{RouteError, RoutingError};
use crate::geo::nearest_index;
use crate::models::{ComposedRoute, Coordinate, RouteGeometry, RoutePlan, RouteStrategy};

pub const MAX_CORRIDOR_POINTS: usize = 4;

const COASTAL_STYLE_MARKERS: &[&str] = &["scenic", "healing", "coastal", "경관", "힐링", "해안"];

/// Road routing backend. Implementations return the path through `coordinates` in order.
pub trait RoutingService: Send + Sync {
    async fn route(&self, coordinates: &[Coordinate]) -> Result<RouteGeometry, RoutingError>;
}

pub fn is_coastal_style(travel_style: &str) -> bool {
    let lowered = travel_style.to_lowercase();
    COASTAL_STYLE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Coastal POIs between the ones nearest `start` and `end`, walking the coast in
/// north-to-south order and wrapping around when needed. At most four points.
pub fn coastal_corridor(store: &PoiStore, start: Coordinate, end: Coordinate) -> Vec<Coordinate> {
    let mut coastal = store
        .coastal()
        .into_iter()
        .map(|poi| poi.coordinates)
        .collect::<Vec<_>>();
    coastal.sort_by(|a, b| b.lat.total_cmp(&a.lat).then(a.lon.total_cmp(&b.lon)));

    let (Ok(from), Ok(to)) = (nearest_index(start, &coastal), nearest_index(end, &coastal)) else {
        return Vec::new();
    };

    let segment = if from <= to {
        coastal[from..=to].to_vec()
    } else {
        coastal[from..]
            .iter()
            .chain(coastal[..=to].iter())
            .copied()
            .collect()
    };

    if segment.len() <= MAX_CORRIDOR_POINTS {
        return segment;
    }

    let stride = segment.len() / MAX_CORRIDOR_POINTS;
    segment
        .into_iter()
        .step_by(stride)
        .take(MAX_CORRIDOR_POINTS)
        .collect()
}

/// Requests the planned route, retrying once with the bare `[start, end]` pair.
#[instrument(skip_all, fields(start = %plan.start.name, end = %plan.end.name, style = %plan.travel_style))]
pub async fn compose_route<R: RoutingService>(
    router: &R,
    store: &PoiStore,
    plan: &RoutePlan,
) -> Result<ComposedRoute, RouteError> {
    let start = plan.start.coordinates;
    let end = plan.end.coordinates;
    debug!(state = "base_route_requested", "composing route");

    let (strategy, coastal_corridor, routed) = if is_coastal_style(&plan.travel_style) {
        let corridor = coastal_corridor(store, start, end);
        let mut routed = Vec::with_capacity(plan.waypoints.len() + 2);
        routed.push(start);
        routed.extend(plan.waypoints.iter().map(|waypoint| waypoint.coordinates));
        routed.push(end);
        (RouteStrategy::Coastal, corridor, routed)
    } else {
        (RouteStrategy::Direct, Vec::new(), vec![start, end])
    };
    debug!(
        state = "coastal_sequencing_decision",
        strategy = ?strategy,
        corridor_points = coastal_corridor.len(),
        routed_points = routed.len(),
        "sequenced route"
    );

    match router.route(&routed).await {
        Ok(geometry) => {
            info!(
                state = "success",
                distance_m = geometry.distance_meters,
                points = geometry.coordinates.len(),
                "route fetched"
            );
            Ok(ComposedRoute {
                geometry,
                strategy,
                coastal_corridor,
                routed_through: routed,
                used_fallback: false,
            })
        }
        Err(primary) => {
            warn!(state = "fallback_retry", error = %primary, "primary route failed, retrying direct");
            let direct = vec![start, end];
            match router.route(&direct).await {
                Ok(geometry) => {
                    info!(state = "done", distance_m = geometry.distance_meters, "fallback route fetched");
                    Ok(ComposedRoute {
                        geometry,
                        strategy,
                        coastal_corridor,
                        routed_through: direct,
                        used_fallback: true,
                    })
                }
                Err(fallback) => {
                    warn!(state = "done", error = %fallback, "fallback route failed");
                    Err(RouteError::Unavailable { primary, fallback })
                }
            }
        }
    }
}
