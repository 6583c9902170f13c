//! Great-circle distance and nearest-point search.

use std::cmp::Ordering;

use crate::error::GeoError;
use crate::models::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers. NaN components propagate to the result.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Index of the candidate closest to `point`; the first of equal minima wins.
pub fn nearest_index(point: Coordinate, candidates: &[Coordinate]) -> Result<usize, GeoError> {
    candidates
        .iter()
        .enumerate()
        .map(|(idx, candidate)| (idx, distance_km(point, *candidate)))
        .fold(None, |best: Option<(usize, f64)>, (idx, dist)| match best {
            Some((_, best_dist))
                if dist.partial_cmp(&best_dist).unwrap_or(Ordering::Greater)
                    != Ordering::Less =>
            {
                best
            }
            _ => Some((idx, dist)),
        })
        .map(|(idx, _)| idx)
        .ok_or(GeoError::EmptyInput)
}

pub fn nearest(point: Coordinate, candidates: &[Coordinate]) -> Result<Coordinate, GeoError> {
    nearest_index(point, candidates).map(|idx| candidates[idx])
}

/// Minimum distance from `point` to any of `samples`, or `None` when empty.
pub fn min_distance_km(point: Coordinate, samples: &[Coordinate]) -> Option<f64> {
    samples
        .iter()
        .map(|sample| distance_km(point, *sample))
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
}

/// Every `stride`-th coordinate starting at the first.
pub fn sample_every(coordinates: &[Coordinate], stride: usize) -> Vec<Coordinate> {
    coordinates.iter().step_by(stride.max(1)).copied().collect()
}
