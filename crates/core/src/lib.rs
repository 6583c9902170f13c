pub mod catalog;
pub mod composer;
pub mod config;
pub mod error;
pub mod geo;
pub mod intent;
pub mod models;
pub mod planner;
pub mod scenery;
pub mod selector;

pub use catalog::PoiStore;
pub use composer::{coastal_corridor, compose_route, is_coastal_style, RoutingService};
pub use config::NavigatorConfig;
pub use error::{CatalogError, GeoError, RouteError, RoutingError};
pub use intent::{analyze_command, classify_intent_rules, IntentClassifier, KeywordIntentClassifier};
pub use models::*;
pub use planner::{build_route_plan, time_recommendations, voice_guidance};
pub use scenery::{find_on_route_waypoints, find_photo_spots, route_scenic_score};
pub use selector::{select_waypoints, PreferenceWeights};
