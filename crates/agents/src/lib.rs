use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use vista_core::intent::normalize_text;
use vista_core::{
    analyze_command, build_route_plan, compose_route, find_on_route_waypoints, find_photo_spots,
    route_scenic_score, select_waypoints, time_recommendations, voice_guidance, AnnotatedRoute,
    CommandAnalysis, CommandInput, IntentClassifier, KeywordIntentClassifier, NamedPlace,
    NavigationReply, NavigationSession, NavigatorConfig, PoiStore, RoutePlan, RoutingService,
    SessionEntry,
};
use vista_observability::AppMetrics;
use vista_storage::SessionRepository;

const JEJU_UTC_OFFSET_SECS: i32 = 9 * 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReply {
    pub analysis: CommandAnalysis,
    pub plan: RoutePlan,
}

pub struct NavigatorAgent<R, S>
where
    R: RoutingService,
    S: SessionRepository,
{
    catalog: Arc<PoiStore>,
    router: Arc<R>,
    store: Arc<S>,
    classifier: Arc<dyn IntentClassifier>,
    config: NavigatorConfig,
    metrics: Arc<AppMetrics>,
}

impl<R, S> Clone for NavigatorAgent<R, S>
where
    R: RoutingService,
    S: SessionRepository,
{
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            router: Arc::clone(&self.router),
            store: Arc::clone(&self.store),
            classifier: Arc::clone(&self.classifier),
            config: self.config.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<R, S> NavigatorAgent<R, S>
where
    R: RoutingService,
    S: SessionRepository,
{
    pub fn new(
        catalog: Arc<PoiStore>,
        router: Arc<R>,
        store: Arc<S>,
        config: NavigatorConfig,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            catalog,
            router,
            store,
            classifier: Arc::new(KeywordIntentClassifier),
            config,
            metrics,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn catalog(&self) -> &PoiStore {
        &self.catalog
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn analyze(&self, text: &str) -> CommandAnalysis {
        let normalized = normalize_text(text);
        analyze_command(&normalized, &self.catalog, self.classifier.as_ref(), &self.config)
    }

    /// Intent analysis and waypoint plan, without calling the routing service.
    #[instrument(skip(self, text))]
    pub fn plan(&self, text: &str) -> PlanReply {
        self.metrics.inc_request();
        let analysis = self.analyze(text);
        let plan = self.plan_for(&analysis);
        info!(
            start = %plan.start.name,
            end = %plan.end.name,
            waypoints = plan.waypoints.len(),
            style = %plan.travel_style,
            "plan built"
        );
        PlanReply { analysis, plan }
    }

    #[instrument(skip(self, input))]
    pub async fn handle_command(&self, input: CommandInput) -> Result<NavigationReply> {
        let started = Instant::now();
        self.metrics.inc_request();

        let analysis = self.analyze(&input.text);
        let plan = self.plan_for(&analysis);

        let session_id = input
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.store
            .append_entry(
                &session_id,
                SessionEntry {
                    at: Utc::now(),
                    command: analysis.command.clone(),
                    plan: plan.clone(),
                },
            )
            .await
            .context("failed to record session entry")?;

        let composed = match compose_route(self.router.as_ref(), &self.catalog, &plan).await {
            Ok(composed) => composed,
            Err(err) => {
                self.metrics.inc_route_failure();
                self.metrics.observe_latency(started.elapsed());
                warn!(session_id = %session_id, error = %err, "route unavailable");
                return Err(err.into());
            }
        };
        if composed.used_fallback {
            self.metrics.inc_routing_fallback();
        }

        let geometry = &composed.geometry.coordinates;
        let route = AnnotatedRoute {
            distance: composed.geometry.distance_meters,
            duration: composed.geometry.duration_seconds,
            scenic_score: route_scenic_score(geometry),
            on_route_pois: find_on_route_waypoints(
                geometry,
                &self.catalog,
                self.config.on_route_threshold_km,
            ),
            photo_spots: find_photo_spots(geometry, self.config.photo_spot_limit),
            waypoints: plan.waypoints.clone(),
            reasoning: plan.reasoning.clone(),
            travel_style: plan.travel_style.clone(),
            estimated_duration_hours: plan.estimated_duration_hours,
            strategy: composed.strategy,
            coastal_corridor: composed.coastal_corridor.clone(),
            used_fallback: composed.used_fallback,
            voice_guidance: voice_guidance(&plan, Some(&composed.geometry)),
            time_recommendations: time_recommendations(local_hour()),
            geometry: composed.geometry.coordinates,
            plan,
        };

        self.metrics.observe_latency(started.elapsed());
        let intents = reply_intents(&analysis);
        info!(
            session_id = %session_id,
            intents = %intents,
            strategy = ?route.strategy,
            scenic_score = route.scenic_score,
            distance_m = route.distance,
            used_fallback = route.used_fallback,
            "command handled"
        );

        Ok(NavigationReply {
            session_id,
            analysis,
            route,
        })
    }

    pub async fn session(&self, session_id: &str) -> Result<Option<NavigationSession>> {
        self.store.load_session(session_id).await
    }

    fn plan_for(&self, analysis: &CommandAnalysis) -> RoutePlan {
        let start = self.resolve_place(&analysis.start, &self.config.default_start);
        let end = self.resolve_place(&analysis.end, &self.config.default_end);
        let waypoints = select_waypoints(
            &self.catalog,
            &analysis.intents,
            &start.name,
            &end.name,
            self.config.waypoint_limit,
        );
        build_route_plan(analysis.intents.clone(), start, end, waypoints)
    }

    fn resolve_place(&self, name: &str, fallback: &NamedPlace) -> NamedPlace {
        if let Some(poi) = self.catalog.lookup(name) {
            return NamedPlace {
                name: poi.name.clone(),
                coordinates: poi.coordinates,
            };
        }
        self.config
            .default_place(name)
            .unwrap_or(fallback)
            .clone()
    }
}

fn reply_intents(analysis: &CommandAnalysis) -> String {
    analysis
        .intents
        .iter()
        .map(|intent| intent.as_code())
        .collect::<Vec<_>>()
        .join(",")
}

fn local_hour() -> u32 {
    let now = Utc::now();
    FixedOffset::east_opt(JEJU_UTC_OFFSET_SECS)
        .map(|offset| now.with_timezone(&offset).hour())
        .unwrap_or_else(|| now.hour())
}
