//! Intent-driven waypoint selection.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::PoiStore;
use crate::models::{Intent, IntentSet, PlannedWaypoint, Poi, PoiCategory};

const DEFAULT_RATING: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoiMatcher {
    Category(PoiCategory),
    Type(&'static str),
}

impl PoiMatcher {
    fn matches(self, poi: &Poi) -> bool {
        match self {
            Self::Category(category) => poi.category == category,
            Self::Type(tag) => poi.poi_type == tag,
        }
    }
}

/// Which POI records satisfy which intent. Korean tags mirror the source catalog.
pub const INTENT_MAPPING: &[(PoiMatcher, Intent)] = &[
    (PoiMatcher::Type("natural-scenery"), Intent::Scenic),
    (PoiMatcher::Type("자연경관"), Intent::Scenic),
    (PoiMatcher::Type("beach"), Intent::Scenic),
    (PoiMatcher::Type("해수욕장"), Intent::Scenic),
    (PoiMatcher::Type("island"), Intent::Scenic),
    (PoiMatcher::Type("섬여행"), Intent::Scenic),
    (PoiMatcher::Category(PoiCategory::Food), Intent::Food),
    (PoiMatcher::Type("cafe-culture"), Intent::Photo),
    (PoiMatcher::Type("카페문화"), Intent::Photo),
    (PoiMatcher::Type("cultural-experience"), Intent::Cultural),
    (PoiMatcher::Type("문화체험"), Intent::Cultural),
    (PoiMatcher::Type("traditional-market"), Intent::Cultural),
    (PoiMatcher::Type("전통시장"), Intent::Cultural),
    (PoiMatcher::Type("scenic-drive"), Intent::Leisurely),
];

pub fn poi_intents(poi: &Poi) -> IntentSet {
    INTENT_MAPPING
        .iter()
        .filter(|(matcher, _)| matcher.matches(poi))
        .map(|(_, intent)| *intent)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWeights {
    pub scenery: f64,
    pub efficiency: f64,
    pub food: f64,
    pub photo: f64,
    pub culture: f64,
    pub relaxation: f64,
}

impl Default for PreferenceWeights {
    fn default() -> Self {
        Self {
            scenery: 0.4,
            efficiency: 0.3,
            food: 0.3,
            photo: 0.2,
            culture: 0.2,
            relaxation: 0.3,
        }
    }
}

impl PreferenceWeights {
    pub fn for_intents(intents: &IntentSet) -> Self {
        let mut weights = Self::default();
        if intents.contains(&Intent::Scenic) {
            weights.scenery = 1.0;
        }
        if intents.contains(&Intent::Fast) {
            weights.efficiency = 1.0;
        }
        if intents.contains(&Intent::Food) {
            weights.food = 0.9;
        }
        if intents.contains(&Intent::Photo) {
            weights.photo = 0.9;
        }
        if intents.contains(&Intent::Cultural) {
            weights.culture = 0.8;
        }
        if intents.contains(&Intent::Leisurely) {
            weights.relaxation = 0.9;
        }
        weights
    }

    pub fn weight_for(&self, intent: Intent) -> f64 {
        match intent {
            Intent::Scenic => self.scenery,
            Intent::Fast => self.efficiency,
            Intent::Food => self.food,
            Intent::Photo => self.photo,
            Intent::Cultural => self.culture,
            Intent::Leisurely => self.relaxation,
            Intent::General => 0.0,
        }
    }

    pub fn as_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("scenery".to_string(), self.scenery),
            ("efficiency".to_string(), self.efficiency),
            ("food".to_string(), self.food),
            ("photo".to_string(), self.photo),
            ("culture".to_string(), self.culture),
            ("relaxation".to_string(), self.relaxation),
        ])
    }
}

/// Rating compounded by `(1 + weight)` once per active intent the POI satisfies.
pub fn score_poi(poi: &Poi, intents: &IntentSet, weights: &PreferenceWeights) -> f64 {
    poi_intents(poi)
        .intersection(intents)
        .fold(poi.rating.unwrap_or(DEFAULT_RATING), |score, intent| {
            score * (1.0 + weights.weight_for(*intent))
        })
}

pub fn select_waypoints(
    store: &PoiStore,
    intents: &IntentSet,
    start: &str,
    end: &str,
    limit: usize,
) -> Vec<PlannedWaypoint> {
    let weights = PreferenceWeights::for_intents(intents);

    let mut candidates = store
        .all()
        .iter()
        .filter(|poi| poi.name != start && poi.name != end)
        .filter(|poi| !poi_intents(poi).is_disjoint(intents))
        .map(|poi| (score_poi(poi, intents, &weights), poi))
        .collect::<Vec<_>>();

    // stable: equal scores keep catalog order
    candidates.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    candidates
        .into_iter()
        .take(limit)
        .map(|(score, poi)| PlannedWaypoint {
            name: poi.name.clone(),
            coordinates: poi.coordinates,
            poi_type: poi.poi_type.clone(),
            score,
            rating: poi.rating,
            description: poi.description.clone(),
        })
        .collect()
}
