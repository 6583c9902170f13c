use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    routing_fallback_total: AtomicU64,
    route_failure_total: AtomicU64,
    degraded_catalog_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub routing_fallback_total: u64,
    pub route_failure_total: u64,
    pub degraded_catalog_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vista_requests_total").increment(1);
    }

    pub fn inc_routing_fallback(&self) {
        self.routing_fallback_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vista_routing_fallback_total").increment(1);
    }

    pub fn inc_route_failure(&self) {
        self.route_failure_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vista_route_failure_total").increment(1);
    }

    pub fn inc_degraded_catalog(&self) {
        self.degraded_catalog_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("vista_degraded_catalog_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        metrics::histogram!("vista_request_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            routing_fallback_total: self.routing_fallback_total.load(Ordering::Relaxed),
            route_failure_total: self.route_failure_total.load(Ordering::Relaxed),
            degraded_catalog_total: self.degraded_catalog_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,vista_agents=info,vista_core=info,vista_routing=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_averages_latency_over_requests() {
        let metrics = AppMetrics::default();
        assert_eq!(metrics.snapshot().avg_latency_millis, 0.0);

        metrics.inc_request();
        metrics.inc_request();
        metrics.observe_latency(Duration::from_millis(30));
        metrics.observe_latency(Duration::from_millis(10));
        metrics.inc_routing_fallback();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.routing_fallback_total, 1);
        assert_eq!(snapshot.route_failure_total, 0);
        assert_eq!(snapshot.avg_latency_millis, 20.0);
    }
}
