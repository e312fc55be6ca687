// HTTP routes for the Inven!RA activity provider endpoints.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, MatchedPath, Query, Request, State,
    },
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::services::{ServeDir, ServeFile};

use crate::analytics::{AnalyticsStore, SampleAnalyticsStore, StudentAnalytics};
use crate::catalog::{self, AnalyticsCatalog, ParameterDefinition};
use crate::config_page;
use crate::error::ProviderError;
use crate::metrics;
use crate::registry::{DeployRequest, DeployedActivity, DeploymentRegistry};

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ConfigParams {
    #[serde(rename = "activityID")]
    pub activity_id: Option<String>,
}

#[derive(Deserialize)]
pub struct DeployParams {
    #[serde(rename = "activityID")]
    pub activity_id: String,
}

#[derive(Deserialize)]
pub struct AnalyticsRequest {
    #[serde(rename = "activityID")]
    pub activity_id: String,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub registry: DeploymentRegistry,
    pub analytics: Arc<dyn AnalyticsStore>,
}

impl AppState {
    /// Fresh registry and sample analytics, with launch URLs under `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            registry: DeploymentRegistry::new(base_url),
            analytics: Arc::new(SampleAnalyticsStore::new()),
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    metrics::register_metrics();

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        // Inven!RA contract
        .route("/config", get(get_config))
        .route("/params", get(get_params))
        .route("/deploy", get(deploy_from_query).post(deploy_from_body))
        .route("/analytics/available", get(get_available_analytics))
        .route("/analytics", post(get_analytics))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Serve `dir/index.html` at `/` and the rest of `dir` under `/static`.
pub fn with_static(router: Router, dir: &Path) -> Router {
    router
        .route_service("/", ServeFile::new(dir.join("index.html")))
        .nest_service("/static", ServeDir::new(dir))
}

/// Record request count and latency, labelled by route template.
async fn track_metrics(req: Request, next: Next) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let method = req.method().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    metrics::API_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint.as_str()])
        .observe(start.elapsed().as_secs_f64());
    metrics::API_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), response.status().as_str()])
        .inc();
    response
}

// ── Service handlers ──────────────────────────────────────────────────

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "deployments": state.registry.len(),
    }))
}

async fn get_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

// ── Config page ───────────────────────────────────────────────────────

fn prefers_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("application/json") && !accept.contains("text/html"))
        .unwrap_or(false)
}

async fn get_config(
    headers: HeaderMap,
    query: Result<Query<ConfigParams>, QueryRejection>,
) -> Result<Response, ProviderError> {
    let Query(params) = query?;
    let activity_id = params.activity_id.as_deref();
    let response = if prefers_json(&headers) {
        Json(config_page::metadata(catalog::parameters(), activity_id)).into_response()
    } else {
        Html(config_page::render_html(catalog::parameters(), activity_id)?).into_response()
    };
    Ok(response)
}

// ── Catalogs ──────────────────────────────────────────────────────────

async fn get_params() -> Json<&'static [ParameterDefinition]> {
    Json(catalog::parameters())
}

async fn get_available_analytics() -> Json<&'static AnalyticsCatalog> {
    Json(catalog::analytics())
}

// ── Deploy ────────────────────────────────────────────────────────────

/// First deploy phase: Inven!RA sends only the activity id.
async fn deploy_from_query(
    State(state): State<AppState>,
    query: Result<Query<DeployParams>, QueryRejection>,
) -> Result<Json<DeployedActivity>, ProviderError> {
    let Query(params) = query?;
    Ok(Json(deploy(&state, DeployRequest::new(params.activity_id))))
}

/// Deploy with the instructor's chosen parameters in the body.
async fn deploy_from_body(
    State(state): State<AppState>,
    body: Result<Json<DeployRequest>, JsonRejection>,
) -> Result<Json<DeployedActivity>, ProviderError> {
    let Json(request) = body?;
    Ok(Json(deploy(&state, request)))
}

fn deploy(state: &AppState, request: DeployRequest) -> DeployedActivity {
    let entry = state.registry.deploy(request);
    tracing::info!(
        activity_id = %entry.activity_id,
        instance_id = %entry.instance_id,
        parameters = entry.parameters.len(),
        "Deployed activity"
    );
    entry
}

// ── Analytics ─────────────────────────────────────────────────────────

/// Learner analytics for an activity. Unknown ids are not an error.
async fn get_analytics(
    State(state): State<AppState>,
    body: Result<Json<AnalyticsRequest>, JsonRejection>,
) -> Result<Json<Vec<StudentAnalytics>>, ProviderError> {
    let Json(request) = body?;
    let bundles = state.analytics.query(&request.activity_id);
    metrics::ANALYTICS_QUERIES_TOTAL.inc();
    tracing::debug!(
        activity_id = %request.activity_id,
        students = bundles.len(),
        "Answered analytics query"
    );
    Ok(Json(bundles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_prefers_json() {
        assert!(prefers_json(&accept("application/json")));
        assert!(!prefers_json(&accept("text/html,application/xhtml+xml,*/*")));
        assert!(!prefers_json(&accept("text/html, application/json")));
        assert!(!prefers_json(&HeaderMap::new()));
    }

    #[test]
    fn test_app_state_starts_empty() {
        let state = AppState::new("http://localhost");
        assert!(state.registry.is_empty());
        assert_eq!(state.analytics.query("x").len(), 2);
    }
}
