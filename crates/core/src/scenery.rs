//! Heuristic scenic value of a route and what lies along it.

use std::cmp::Ordering;

use crate::catalog::PoiStore;
use crate::geo::{distance_km, min_distance_km, sample_every};
use crate::models::{Coordinate, OnRoutePoi, PhotoSpot};

pub const ISLAND_CENTER: Coordinate = Coordinate::new_unchecked(126.5312, 33.3617);
pub const HALLASAN_SUMMIT: Coordinate = Coordinate::new_unchecked(126.5311, 33.3617);

const SCENIC_SAMPLE_STRIDE: usize = 30;
const PHOTO_SAMPLE_STRIDE: usize = 50;
const ON_ROUTE_SAMPLE_STRIDE: usize = 20;
const PHOTO_SPOT_THRESHOLD: f64 = 7.5;

pub const COASTAL_VIEWPOINT: &str = "coastal viewpoint";
pub const HALLASAN_VIEWPOINT: &str = "Hallasan viewpoint";

/// Farther from the island center means closer to the shoreline.
pub fn coast_proximity_score(point: Coordinate) -> f64 {
    let from_center = distance_km(point, ISLAND_CENTER);
    if from_center > 15.0 {
        9.5
    } else if from_center > 10.0 {
        7.5
    } else if from_center > 5.0 {
        5.5
    } else {
        4.0
    }
}

pub fn landmark_view_score(point: Coordinate) -> f64 {
    let from_summit = distance_km(point, HALLASAN_SUMMIT);
    if (5.0..=20.0).contains(&from_summit) {
        8.5
    } else if from_summit < 5.0 {
        7.0
    } else {
        5.0
    }
}

pub fn point_score(point: Coordinate) -> f64 {
    (coast_proximity_score(point) + landmark_view_score(point)) / 2.0
}

/// Mean sampled point score in `[0, 10]`; `0.0` for an empty geometry.
/// Routes shorter than one stride are scored on every point.
pub fn route_scenic_score(geometry: &[Coordinate]) -> f64 {
    let samples = if geometry.len() < SCENIC_SAMPLE_STRIDE {
        geometry.to_vec()
    } else {
        sample_every(geometry, SCENIC_SAMPLE_STRIDE)
    };
    if samples.is_empty() {
        return 0.0;
    }

    samples.iter().map(|point| point_score(*point)).sum::<f64>() / samples.len() as f64
}

pub fn find_photo_spots(geometry: &[Coordinate], limit: usize) -> Vec<PhotoSpot> {
    sample_every(geometry, PHOTO_SAMPLE_STRIDE)
        .into_iter()
        .filter_map(|point| {
            let coast = coast_proximity_score(point);
            let landmark = landmark_view_score(point);
            let score = (coast + landmark) / 2.0;
            if score <= PHOTO_SPOT_THRESHOLD {
                return None;
            }
            let label = if coast > landmark {
                COASTAL_VIEWPOINT
            } else {
                HALLASAN_VIEWPOINT
            };
            Some(PhotoSpot {
                coordinates: point,
                score,
                label: label.to_string(),
            })
        })
        .take(limit)
        .collect()
}

/// Catalog POIs within `threshold_km` of the sampled route, nearest first.
pub fn find_on_route_waypoints(
    geometry: &[Coordinate],
    store: &PoiStore,
    threshold_km: f64,
) -> Vec<OnRoutePoi> {
    let samples = sample_every(geometry, ON_ROUTE_SAMPLE_STRIDE);

    let mut found = store
        .all()
        .iter()
        .filter_map(|poi| {
            let distance = min_distance_km(poi.coordinates, &samples)?;
            (distance < threshold_km).then(|| OnRoutePoi {
                name: poi.name.clone(),
                category: poi.category,
                poi_type: poi.poi_type.clone(),
                coordinates: poi.coordinates,
                distance_from_route_km: distance,
            })
        })
        .collect::<Vec<_>>();

    found.sort_by(|a, b| {
        a.distance_from_route_km
            .partial_cmp(&b.distance_from_route_km)
            .unwrap_or(Ordering::Equal)
    });
    found
}
