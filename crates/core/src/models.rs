use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// A WGS84 position in `(longitude, latitude)` order, serialized as `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Result<Self, GeoError> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::OutOfRange { lon, lat });
        }
        Ok(Self { lon, lat })
    }

    /// Skips range validation. Used for fixed constants and NaN propagation.
    pub const fn new_unchecked(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(value: [f64; 2]) -> Self {
        Self::new_unchecked(value[0], value[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.lon, value.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lon, self.lat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    #[serde(alias = "관광명소")]
    Attraction,
    #[serde(alias = "핫플레이스")]
    Hotspot,
    #[serde(alias = "맛집")]
    Food,
    #[serde(alias = "카페")]
    Cafe,
    #[serde(alias = "교통")]
    Transport,
    #[serde(alias = "숙소")]
    Lodging,
    #[serde(other)]
    Other,
}

impl PoiCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "attraction" | "관광명소" => Some(Self::Attraction),
            "hotspot" | "핫플레이스" => Some(Self::Hotspot),
            "food" | "restaurant" | "맛집" => Some(Self::Food),
            "cafe" | "카페" => Some(Self::Cafe),
            "transport" | "교통" => Some(Self::Transport),
            "lodging" | "숙소" => Some(Self::Lodging),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Attraction => "attraction",
            Self::Hotspot => "hotspot",
            Self::Food => "food",
            Self::Cafe => "cafe",
            Self::Transport => "transport",
            Self::Lodging => "lodging",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub coordinates: Coordinate,
    pub category: PoiCategory,
    #[serde(rename = "type")]
    pub poi_type: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub visit_duration_minutes: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub road_type: Option<String>,
    #[serde(default)]
    pub best_time: Option<String>,
}

impl Poi {
    pub fn new(
        name: impl Into<String>,
        coordinates: Coordinate,
        category: PoiCategory,
        poi_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            coordinates,
            category,
            poi_type: poi_type.into(),
            keywords: Vec::new(),
            rating: None,
            visit_duration_minutes: None,
            description: None,
            road_type: None,
            best_time: None,
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_road_type(mut self, road_type: impl Into<String>) -> Self {
        self.road_type = Some(road_type.into());
        self
    }

    /// Coastal POIs seed the scenic corridor.
    pub fn is_coastal(&self) -> bool {
        let road_is_coastal = self
            .road_type
            .as_deref()
            .map(|road| road == "coastal-road" || road == "해안도로")
            .unwrap_or(false);

        road_is_coastal || self.poi_type.contains("coastal") || self.poi_type.contains("해안")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Scenic,
    Food,
    Fast,
    Leisurely,
    Photo,
    Cultural,
    General,
}

impl Intent {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Scenic => "scenic",
            Self::Food => "food",
            Self::Fast => "fast",
            Self::Leisurely => "leisurely",
            Self::Photo => "photo",
            Self::Cultural => "cultural",
            Self::General => "general",
        }
    }
}

/// Ordered, de-duplicated intent set. Never empty once produced by the extractor.
pub type IntentSet = std::collections::BTreeSet<Intent>;

/// A named place that can stand in for a POI when the catalog lacks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPlace {
    pub name: String,
    pub coordinates: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandAnalysis {
    pub command: String,
    pub intents: IntentSet,
    pub start: String,
    pub end: String,
    pub mentioned_locations: Vec<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedWaypoint {
    pub name: String,
    pub coordinates: Coordinate,
    #[serde(rename = "type")]
    pub poi_type: String,
    pub score: f64,
    pub rating: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelStyle {
    Healing,
    Efficient,
    PhotoHotspot,
    Gourmet,
    ScenicNature,
    Cultural,
    Balanced,
}

impl TravelStyle {
    pub fn label(self) -> &'static str {
        match self {
            Self::Healing => "Relaxed healing trip",
            Self::Efficient => "Efficient itinerary",
            Self::PhotoHotspot => "Photo hotspot trip",
            Self::Gourmet => "Gourmet tour",
            Self::ScenicNature => "Scenic nature drive",
            Self::Cultural => "Cultural immersion",
            Self::Balanced => "Balanced island tour",
        }
    }

    pub fn duration_multiplier(self) -> f64 {
        match self {
            Self::Healing => 1.5,
            Self::Efficient => 0.8,
            Self::PhotoHotspot => 1.3,
            Self::Gourmet => 1.4,
            Self::ScenicNature => 1.2,
            Self::Cultural => 1.3,
            Self::Balanced => 1.0,
        }
    }
}

/// Intent-derived plan handed to the composer and echoed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub start: NamedPlace,
    pub end: NamedPlace,
    pub intents: IntentSet,
    pub waypoints: Vec<PlannedWaypoint>,
    pub travel_style: String,
    pub reasoning: String,
    pub highlights: Vec<String>,
    pub estimated_duration_hours: f64,
    pub satisfaction_score: f64,
    pub preference_weights: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub coordinates: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategy {
    Direct,
    Coastal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedRoute {
    pub geometry: RouteGeometry,
    pub strategy: RouteStrategy,
    pub coastal_corridor: Vec<Coordinate>,
    pub routed_through: Vec<Coordinate>,
    pub used_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSpot {
    pub coordinates: Coordinate,
    pub score: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnRoutePoi {
    pub name: String,
    pub category: PoiCategory,
    #[serde(rename = "type")]
    pub poi_type: String,
    pub coordinates: Coordinate,
    pub distance_from_route_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedRoute {
    pub distance: f64,
    pub duration: f64,
    pub geometry: Vec<Coordinate>,
    pub scenic_score: f64,
    pub on_route_pois: Vec<OnRoutePoi>,
    pub photo_spots: Vec<PhotoSpot>,
    pub waypoints: Vec<PlannedWaypoint>,
    pub reasoning: String,
    pub travel_style: String,
    pub estimated_duration_hours: f64,
    pub strategy: RouteStrategy,
    pub coastal_corridor: Vec<Coordinate>,
    pub used_fallback: bool,
    pub plan: RoutePlan,
    pub voice_guidance: Vec<String>,
    pub time_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub at: DateTime<Utc>,
    pub command: String,
    pub plan: RoutePlan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationSession {
    pub session_id: String,
    pub entries: Vec<SessionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInput {
    pub session_id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationReply {
    pub session_id: String,
    pub analysis: CommandAnalysis,
    pub route: AnnotatedRoute,
}
