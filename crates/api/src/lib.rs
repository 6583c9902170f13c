mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Json, Path, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::error;
use vista_agents::NavigatorAgent;
use vista_core::{CommandInput, NavigatorConfig, Poi, PoiCategory, RouteError};
use vista_observability::AppMetrics;
use vista_routing::{OsrmClient, RoutingConfig};
use vista_storage::{catalog_path_from_env, load_catalog, MemoryStore};

pub use crate::rate_limit::IpRateLimiter;

const MAX_COMMAND_LEN: usize = 500;
const DEFAULT_API_KEY: &str = "dev-vista-key";

pub type Navigator = NavigatorAgent<OsrmClient, MemoryStore>;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub catalog_path: String,
    pub routing: RoutingConfig,
    pub navigator: NavigatorConfig,
    pub api_key: String,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    pub allowed_origins: Vec<String>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let rate_limit_window = Duration::from_secs(
            env::var("VISTA_API_RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(60),
        );
        let rate_limit_max = env::var("VISTA_API_RATE_LIMIT_MAX")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(60);
        let allowed_origins = env::var("VISTA_ALLOWED_ORIGINS")
            .ok()
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            catalog_path: catalog_path_from_env(),
            routing: RoutingConfig::from_env(),
            navigator: NavigatorConfig::default(),
            api_key: env::var("VISTA_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string()),
            rate_limit_window,
            rate_limit_max,
            allowed_origins,
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<Navigator>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
    pub catalog_degraded: bool,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    catalog: CatalogHealth,
    rate_limited_clients: usize,
    metrics: vista_observability::MetricsSnapshot,
}

#[derive(Debug, Serialize)]
struct CatalogHealth {
    pois: usize,
    degraded: bool,
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    text: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PoiQuery {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    q: Option<String>,
}

#[derive(Debug, Serialize)]
struct PoiListResponse {
    total: usize,
    pois: Vec<Poi>,
}

pub async fn build_app() -> Result<Router> {
    build_app_with(ApiConfig::from_env()).await
}

pub async fn build_app_with(config: ApiConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();

    let catalog = load_catalog(&config.catalog_path);
    if catalog.degraded {
        metrics.inc_degraded_catalog();
    }
    let routing_client = OsrmClient::new(config.routing.clone())?;

    let agent = Arc::new(NavigatorAgent::new(
        Arc::new(catalog.store),
        Arc::new(routing_client),
        Arc::new(MemoryStore::new()),
        config.navigator.clone(),
        metrics.clone(),
    ));

    let state = ApiState {
        agent,
        metrics,
        api_key: config.api_key,
        limiter: IpRateLimiter::new(config.rate_limit_window, config.rate_limit_max),
        catalog_degraded: catalog.degraded,
        allowed_origins: Arc::new(config.allowed_origins),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/navigate", post(navigate))
        .route("/v1/plan", post(plan))
        .route("/v1/pois", get(list_pois))
        .route("/v1/sessions/:session_id", get(session_history))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(16 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        catalog: CatalogHealth {
            pois: state.agent.catalog().len(),
            degraded: state.catalog_degraded,
        },
        rate_limited_clients: state.limiter.tracked_clients(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn navigate(
    State(state): State<ApiState>,
    Json(request): Json<CommandRequest>,
) -> Response {
    let text = match validate_command(&request.text) {
        Ok(text) => text,
        Err(response) => return response,
    };

    let input = CommandInput {
        session_id: request.session_id.filter(|id| !id.trim().is_empty()),
        text,
    };

    match state.agent.handle_command(input).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => match err.downcast_ref::<RouteError>() {
            Some(route_error) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "error": "route_unavailable",
                    "message": route_error.to_string()
                })),
            )
                .into_response(),
            None => {
                error!(error = ?err, "navigation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "internal_error",
                        "message": "navigation failed"
                    })),
                )
                    .into_response()
            }
        },
    }
}

async fn plan(State(state): State<ApiState>, Json(request): Json<CommandRequest>) -> Response {
    match validate_command(&request.text) {
        Ok(text) => (StatusCode::OK, Json(state.agent.plan(&text))).into_response(),
        Err(response) => response,
    }
}

async fn list_pois(State(state): State<ApiState>, Query(query): Query<PoiQuery>) -> Response {
    let category = match query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(raw) => match PoiCategory::parse(raw) {
            Some(category) => Some(category),
            None => {
                return bad_request(&format!("unknown category: {raw}"));
            }
        },
        None => None,
    };

    let pois = state
        .agent
        .catalog()
        .search(category, query.q.as_deref())
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();

    (
        StatusCode::OK,
        Json(PoiListResponse {
            total: pois.len(),
            pois,
        }),
    )
        .into_response()
}

async fn session_history(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.agent.session(&session_id).await {
        Ok(Some(session)) => (StatusCode::OK, Json(session)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "not_found",
                "message": "unknown session id"
            })),
        )
            .into_response(),
        Err(err) => {
            error!(error = ?err, session_id = %session_id, "session lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "internal_error" })),
            )
                .into_response()
        }
    }
}

fn validate_command(text: &str) -> Result<String, Response> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(bad_request("text must not be empty"));
    }
    if trimmed.chars().count() > MAX_COMMAND_LEN {
        return Err(bad_request("text is too long"));
    }
    Ok(trimmed.to_string())
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "invalid_request",
            "message": message
        })),
    )
        .into_response()
}

fn is_public_endpoint(path: &str) -> bool {
    matches!(path, "/health")
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": "missing or invalid x-api-key"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:5500")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
        ])
}
