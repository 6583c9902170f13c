use crate::models::{
    Intent, IntentSet, NamedPlace, PlannedWaypoint, RouteGeometry, RoutePlan, TravelStyle,
};
use crate::selector::PreferenceWeights;

const BASE_TRIP_HOURS: f64 = 1.5;
const HOURS_PER_WAYPOINT: f64 = 0.5;
const MAX_HIGHLIGHTS: usize = 5;
const SPOKEN_HIGHLIGHTS: usize = 3;
const DEFAULT_WAYPOINT_RATING: f64 = 3.0;

pub fn travel_style(intents: &IntentSet) -> TravelStyle {
    const PRIORITY: &[(Intent, TravelStyle)] = &[
        (Intent::Leisurely, TravelStyle::Healing),
        (Intent::Fast, TravelStyle::Efficient),
        (Intent::Photo, TravelStyle::PhotoHotspot),
        (Intent::Food, TravelStyle::Gourmet),
        (Intent::Scenic, TravelStyle::ScenicNature),
        (Intent::Cultural, TravelStyle::Cultural),
    ];

    PRIORITY
        .iter()
        .find(|(intent, _)| intents.contains(intent))
        .map(|(_, style)| *style)
        .unwrap_or(TravelStyle::Balanced)
}

fn intent_reason(intent: Intent) -> &'static str {
    match intent {
        Intent::Scenic | Intent::General => "to take in Jeju's natural scenery",
        Intent::Food => "for a taste of Jeju's local food",
        Intent::Photo => "to collect photos worth sharing",
        Intent::Leisurely => "to slow down and unwind",
        Intent::Fast => "to make the most of limited time",
        Intent::Cultural => "to experience Jeju's history and culture",
    }
}

fn intent_highlight(intent: Intent) -> Option<&'static str> {
    match intent {
        Intent::Scenic => Some("Emerald coastline views along the Jeju sea"),
        Intent::Food => Some("Jeju black pork and fresh seafood"),
        Intent::Photo => Some("Photo zones made for sharing"),
        Intent::Cultural => Some("Jeju history and living traditions"),
        Intent::Leisurely => Some("An unhurried island atmosphere"),
        Intent::Fast | Intent::General => None,
    }
}

pub fn reasoning(intents: &IntentSet, style: TravelStyle) -> String {
    let primary = intents.iter().next().copied().unwrap_or(Intent::General);
    format!(
        "Planned a {} route {}.",
        style.label().to_lowercase(),
        intent_reason(primary)
    )
}

pub fn highlights(intents: &IntentSet, waypoints: &[PlannedWaypoint]) -> Vec<String> {
    const ORDER: &[Intent] = &[
        Intent::Scenic,
        Intent::Food,
        Intent::Photo,
        Intent::Cultural,
        Intent::Leisurely,
    ];

    let from_intents = ORDER
        .iter()
        .filter(|intent| intents.contains(intent))
        .filter_map(|intent| intent_highlight(*intent))
        .map(str::to_string);

    let from_waypoints = waypoints.iter().map(|waypoint| match &waypoint.description {
        Some(description) => format!("{}: {}", waypoint.name, description),
        None => waypoint.name.clone(),
    });

    from_intents
        .chain(from_waypoints)
        .take(MAX_HIGHLIGHTS)
        .collect()
}

pub fn estimated_duration_hours(waypoint_count: usize, style: TravelStyle) -> f64 {
    (BASE_TRIP_HOURS + HOURS_PER_WAYPOINT * waypoint_count as f64) * style.duration_multiplier()
}

pub fn satisfaction_score(waypoints: &[PlannedWaypoint]) -> f64 {
    if waypoints.is_empty() {
        return 5.0;
    }
    let total = waypoints
        .iter()
        .map(|waypoint| waypoint.rating.unwrap_or(DEFAULT_WAYPOINT_RATING))
        .sum::<f64>();
    (total / waypoints.len() as f64 * 2.0).min(10.0)
}

pub fn build_route_plan(
    intents: IntentSet,
    start: NamedPlace,
    end: NamedPlace,
    waypoints: Vec<PlannedWaypoint>,
) -> RoutePlan {
    let style = travel_style(&intents);

    RoutePlan {
        reasoning: reasoning(&intents, style),
        highlights: highlights(&intents, &waypoints),
        estimated_duration_hours: estimated_duration_hours(waypoints.len(), style),
        satisfaction_score: satisfaction_score(&waypoints),
        preference_weights: PreferenceWeights::for_intents(&intents).as_map(),
        travel_style: style.label().to_string(),
        start,
        end,
        intents,
        waypoints,
    }
}

pub fn voice_guidance(plan: &RoutePlan, geometry: Option<&RouteGeometry>) -> Vec<String> {
    let mut lines = vec![
        plan.reasoning.clone(),
        format!(
            "From {} to {}, about {:.1} hours.",
            plan.start.name, plan.end.name, plan.estimated_duration_hours
        ),
    ];

    if !plan.waypoints.is_empty() {
        let names = plan
            .waypoints
            .iter()
            .map(|waypoint| waypoint.name.as_str())
            .collect::<Vec<_>>();
        lines.push(format!("Recommended stops: {}.", names.join(", ")));
    }

    lines.extend(plan.highlights.iter().take(SPOKEN_HIGHLIGHTS).cloned());
    lines.push(format!(
        "Expected satisfaction for this route: {:.1}/10.",
        plan.satisfaction_score
    ));

    if let Some(geometry) = geometry {
        lines.push(format!(
            "Total distance {:.1} km, roughly {:.0} minutes of driving.",
            geometry.distance_meters / 1000.0,
            geometry.duration_seconds / 60.0
        ));
    }

    lines
}

/// Suggestions for the local hour of departure (0-23).
pub fn time_recommendations(hour: u32) -> Vec<String> {
    let mut suggestions = Vec::new();
    if (5..=7).contains(&hour) {
        suggestions.push("Good time to catch the sunrise from an east-coast peak.".to_string());
    }
    if (11..=14).contains(&hour) {
        suggestions.push("Lunch hour: a food stop along the way fits well.".to_string());
    }
    if (17..=19).contains(&hour) {
        suggestions.push("Sunset is near; west-coast viewpoints are at their best.".to_string());
    }
    suggestions
}
