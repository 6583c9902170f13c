use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, NamedPlace};

pub const DEFAULT_WAYPOINT_LIMIT: usize = 2;
pub const DEFAULT_ON_ROUTE_THRESHOLD_KM: f64 = 5.0;
pub const DEFAULT_PHOTO_SPOT_LIMIT: usize = 5;

/// Planner knobs. The default endpoints keep every command routable even when
/// the command or the catalog names no usable place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub default_start: NamedPlace,
    pub default_end: NamedPlace,
    pub waypoint_limit: usize,
    pub on_route_threshold_km: f64,
    pub photo_spot_limit: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            default_start: NamedPlace {
                name: "Jeju International Airport".to_string(),
                coordinates: Coordinate::new_unchecked(126.4930, 33.5107),
            },
            default_end: NamedPlace {
                name: "Seongsan Ilchulbong".to_string(),
                coordinates: Coordinate::new_unchecked(126.9423, 33.4586),
            },
            waypoint_limit: DEFAULT_WAYPOINT_LIMIT,
            on_route_threshold_km: DEFAULT_ON_ROUTE_THRESHOLD_KM,
            photo_spot_limit: DEFAULT_PHOTO_SPOT_LIMIT,
        }
    }
}

impl NavigatorConfig {
    /// Coordinates for one of the configured fallback endpoints, by name.
    pub fn default_place(&self, name: &str) -> Option<&NamedPlace> {
        [&self.default_start, &self.default_end]
            .into_iter()
            .find(|place| place.name == name)
    }
}
