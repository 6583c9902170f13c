use std::sync::Arc;

use vista_agents::NavigatorAgent;
use vista_core::{
    route_scenic_score, CommandInput, Intent, NavigatorConfig, PoiStore, RouteError,
    RouteStrategy,
};
use vista_observability::AppMetrics;
use vista_storage::{load_catalog, MemoryStore};
use vista_tests::{bundled_catalog_path, line_geometry, LineRouter};

fn catalog() -> PoiStore {
    let load = load_catalog(bundled_catalog_path());
    assert!(!load.degraded, "bundled catalog should load");
    load.store
}

fn navigator(
    catalog: PoiStore,
    router: Arc<LineRouter>,
    metrics: Arc<AppMetrics>,
) -> NavigatorAgent<LineRouter, MemoryStore> {
    NavigatorAgent::new(
        Arc::new(catalog),
        router,
        Arc::new(MemoryStore::new()),
        NavigatorConfig::default(),
        metrics,
    )
}

fn command(text: &str) -> CommandInput {
    CommandInput {
        session_id: None,
        text: text.to_string(),
    }
}

#[tokio::test]
async fn korean_healing_command_follows_the_coast() {
    let router = Arc::new(LineRouter::new());
    let agent = navigator(catalog(), Arc::clone(&router), AppMetrics::shared());

    let reply = agent
        .handle_command(command("제주공항에서 성산일출봉까지 경치 좋은 길로 천천히"))
        .await
        .unwrap();

    assert!(reply.analysis.intents.contains(&Intent::Scenic));
    assert!(reply.analysis.intents.contains(&Intent::Leisurely));
    assert_eq!(reply.analysis.start, "Jeju International Airport");
    assert_eq!(reply.analysis.end, "Seongsan Ilchulbong");

    let route = &reply.route;
    assert_eq!(route.travel_style, "Relaxed healing trip");
    assert_eq!(route.strategy, RouteStrategy::Coastal);
    assert!((1..=4).contains(&route.coastal_corridor.len()));
    assert_eq!(route.waypoints.len(), 2);
    assert!((0.0..=10.0).contains(&route.scenic_score));
    assert!(route.photo_spots.len() <= 5);
    assert!(route
        .on_route_pois
        .windows(2)
        .all(|pair| pair[0].distance_from_route_km <= pair[1].distance_from_route_km));
    assert!(route
        .voice_guidance
        .last()
        .is_some_and(|line| line.contains("km")));
    assert_eq!(router.calls(), 1);
}

#[tokio::test]
async fn serialized_route_uses_camel_case() {
    let agent = navigator(catalog(), Arc::new(LineRouter::new()), AppMetrics::shared());
    let reply = agent.handle_command(command("성산까지 맛집")).await.unwrap();

    let value = serde_json::to_value(&reply.route).unwrap();
    for key in [
        "distance",
        "duration",
        "geometry",
        "scenicScore",
        "onRoutePois",
        "photoSpots",
        "waypoints",
        "reasoning",
        "travelStyle",
        "estimatedDurationHours",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    assert!(value["geometry"][0].is_array());
}

#[tokio::test]
async fn fallback_is_counted_once() {
    let router = Arc::new(LineRouter::failing_first(1));
    let metrics = AppMetrics::shared();
    let agent = navigator(catalog(), Arc::clone(&router), Arc::clone(&metrics));

    let reply = agent
        .handle_command(command("from Airport to Sunrise Peak, scenic route please"))
        .await
        .unwrap();

    assert!(reply.route.used_fallback);
    assert_eq!(reply.route.strategy, RouteStrategy::Coastal);
    assert_eq!(router.calls(), 2);
    assert_eq!(metrics.snapshot().routing_fallback_total, 1);

    let direct = line_geometry(&[
        reply.route.plan.start.coordinates,
        reply.route.plan.end.coordinates,
    ]);
    assert_eq!(reply.route.geometry, direct.coordinates);
    assert_eq!(reply.route.scenic_score, route_scenic_score(&direct.coordinates));
}

#[tokio::test]
async fn persistent_failure_is_route_unavailable() {
    let router = Arc::new(LineRouter::failing_first(usize::MAX));
    let agent = navigator(catalog(), Arc::clone(&router), AppMetrics::shared());

    let err = agent
        .handle_command(command("성산일출봉까지 빨리"))
        .await
        .unwrap_err();

    assert!(err.downcast_ref::<RouteError>().is_some());
    assert_eq!(router.calls(), 2);
}

#[tokio::test]
async fn empty_catalog_routes_between_defaults() {
    let router = Arc::new(LineRouter::new());
    let agent = navigator(PoiStore::empty(), Arc::clone(&router), AppMetrics::shared());

    let reply = agent
        .handle_command(command("scenic drive please"))
        .await
        .unwrap();

    let defaults = NavigatorConfig::default();
    assert!(reply.route.waypoints.is_empty());
    assert!(reply.route.coastal_corridor.is_empty());
    assert!(reply.route.on_route_pois.is_empty());
    assert_eq!(reply.route.plan.start, defaults.default_start);
    assert_eq!(reply.route.plan.end, defaults.default_end);
    assert_eq!(reply.route.plan.satisfaction_score, 5.0);
    assert_eq!(router.calls(), 1);
}

#[tokio::test]
async fn session_history_keeps_command_order() {
    let agent = navigator(catalog(), Arc::new(LineRouter::new()), AppMetrics::shared());

    let first = agent.handle_command(command("애월에서 협재까지 사진")).await.unwrap();
    let second = agent
        .handle_command(CommandInput {
            session_id: Some(first.session_id.clone()),
            text: "협재에서 성산까지 문화 체험".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(first.session_id, second.session_id);

    let session = agent.session(&first.session_id).await.unwrap().unwrap();
    let styles = session
        .entries
        .iter()
        .map(|entry| entry.plan.travel_style.as_str())
        .collect::<Vec<_>>();
    assert_eq!(styles, vec!["Photo hotspot trip", "Cultural immersion"]);
}
