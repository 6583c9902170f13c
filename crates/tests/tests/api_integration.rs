use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;
use vista_api::{build_app_with, ApiConfig};
use vista_core::NavigatorConfig;
use vista_routing::RoutingConfig;
use vista_tests::{bundled_catalog_path, UNREACHABLE_OSRM_URL};

const API_KEY: &str = "test-key";

fn config() -> ApiConfig {
    ApiConfig {
        catalog_path: bundled_catalog_path().display().to_string(),
        routing: RoutingConfig {
            timeout: Duration::from_secs(2),
            ..RoutingConfig::default()
        }
        .with_base_url(UNREACHABLE_OSRM_URL),
        navigator: NavigatorConfig::default(),
        api_key: API_KEY.to_string(),
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 100,
        allowed_origins: Vec::new(),
    }
}

async fn app() -> Router {
    build_app_with(config()).await.expect("app should build")
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_is_public_and_reports_catalog() {
    let response = app()
        .await
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["catalog"]["degraded"], false);
    assert!(parsed["catalog"]["pois"].as_u64().unwrap() > 10);
}

#[tokio::test]
async fn missing_catalog_is_reported_degraded() {
    let mut config = config();
    config.catalog_path = "/nonexistent/catalog.json".to_string();
    let app = build_app_with(config).await.expect("app should build");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let parsed = body_json(response).await;
    assert_eq!(parsed["catalog"]["degraded"], true);
    assert_eq!(parsed["metrics"]["degraded_catalog_total"], 1);
}

#[tokio::test]
async fn navigate_requires_api_key() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/navigate")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "scenic drive" }).to_string()))
        .unwrap();

    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn plan_returns_waypoints_without_routing() {
    let response = app()
        .await
        .oneshot(post_json(
            "/v1/plan",
            json!({ "text": "from Airport to Sunrise Peak, scenic route please" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["analysis"]["intents"], json!(["scenic"]));
    assert_eq!(parsed["plan"]["start"]["name"], "Jeju International Airport");
    assert_eq!(parsed["plan"]["end"]["name"], "Seongsan Ilchulbong");
    assert_eq!(parsed["plan"]["travel_style"], "Scenic nature drive");
    assert_eq!(parsed["plan"]["waypoints"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn navigate_maps_unreachable_router_to_503() {
    let response = app()
        .await
        .oneshot(post_json(
            "/v1/navigate",
            json!({ "text": "제주공항에서 성산일출봉까지 빨리" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let parsed = body_json(response).await;
    assert_eq!(parsed["error"], "route_unavailable");
}

#[tokio::test]
async fn empty_command_is_rejected() {
    let response = app()
        .await
        .oneshot(post_json("/v1/navigate", json!({ "text": "   " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pois_filter_by_category() {
    let response = app().await.oneshot(get("/v1/pois?category=food")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["total"], 3);
    assert!(parsed["pois"]
        .as_array()
        .unwrap()
        .iter()
        .all(|poi| poi["category"] == "food"));

    let rejected = app().await.oneshot(get("/v1/pois?category=spaceport")).await.unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_session_is_404() {
    let response = app()
        .await
        .oneshot(get("/v1/sessions/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_limit_applies_per_client() {
    let mut config = config();
    config.rate_limit_max = 1;
    let app = build_app_with(config).await.expect("app should build");

    let first = app.clone().oneshot(get("/v1/pois")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.clone().oneshot(get("/v1/pois")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(health).await["rate_limited_clients"], 1);
}
