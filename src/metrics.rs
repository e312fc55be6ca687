// Prometheus metrics definitions for the activity provider.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Distinct activities deployed since startup. Re-deploys do not count.
    pub static ref DEPLOYED_ACTIVITIES: IntGauge = IntGauge::new(
        "wordsearch_deployed_activities",
        "Distinct activities deployed since startup",
    )
    .unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Total deploy calls, including re-deploys of a known activity.
    pub static ref DEPLOYMENTS_TOTAL: IntCounter = IntCounter::new(
        "wordsearch_deployments_total",
        "Total deploy calls",
    )
    .unwrap();

    /// Total analytics queries answered.
    pub static ref ANALYTICS_QUERIES_TOTAL: IntCounter = IntCounter::new(
        "wordsearch_analytics_queries_total",
        "Total analytics queries answered",
    )
    .unwrap();

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("wordsearch_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "wordsearch_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.5]),
        &["endpoint"],
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call repeatedly.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(DEPLOYED_ACTIVITIES.clone()),
            Box::new(DEPLOYMENTS_TOTAL.clone()),
            Box::new(ANALYTICS_QUERIES_TOTAL.clone()),
            Box::new(API_REQUESTS_TOTAL.clone()),
            Box::new(API_REQUEST_DURATION_SECONDS.clone()),
        ];

        for c in collectors {
            if let Err(e) = REGISTRY.register(c) {
                tracing::error!("Failed to register metric: {e}");
            }
        }
    });
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        register_metrics();
        register_metrics();
        API_REQUESTS_TOTAL
            .with_label_values(&["GET", "/params", "200"])
            .inc();
        let output = gather_metrics();
        assert!(output.contains("wordsearch_api_requests_total"));
    }

    #[test]
    fn test_metric_increments() {
        let before = DEPLOYMENTS_TOTAL.get();
        DEPLOYMENTS_TOTAL.inc();
        assert!(DEPLOYMENTS_TOTAL.get() > before);

        ANALYTICS_QUERIES_TOTAL.inc();
        DEPLOYED_ACTIVITIES.inc();
        API_REQUEST_DURATION_SECONDS
            .with_label_values(&["/deploy"])
            .observe(0.002);
    }
}
