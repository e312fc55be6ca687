// Error type shared by the HTTP handlers and the analytics store.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::MetricType;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The query string was missing a required field or could not be parsed.
    #[error("invalid query string")]
    InvalidQuery(String),

    /// The JSON body was missing, malformed, or of the wrong shape.
    #[error("invalid request body")]
    InvalidBody(String),

    /// An analytics observation named a metric the catalog does not declare.
    #[error("unknown metric `{0}`")]
    UnknownMetric(String),

    /// An analytics observation carried a value of the wrong shape for its metric.
    #[error("metric `{metric}` expects a value of type {expected}")]
    MetricTypeMismatch { metric: String, expected: MetricType },

    /// The configuration page could not be rendered.
    #[error("failed to render page")]
    Render(#[from] std::fmt::Error),
}

impl ProviderError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProviderError::InvalidQuery(_) | ProviderError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ProviderError::UnknownMetric(_) | ProviderError::MetricTypeMismatch { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ProviderError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            ProviderError::InvalidQuery(detail) | ProviderError::InvalidBody(detail) => {
                detail.clone()
            }
            ProviderError::UnknownMetric(name) => name.clone(),
            ProviderError::MetricTypeMismatch { metric, .. } => metric.clone(),
            ProviderError::Render(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        tracing::warn!(status = status.as_u16(), "Rejected request: {}: {}", self, detail);
        (
            status,
            Json(json!({ "error": self.to_string(), "detail": detail })),
        )
            .into_response()
    }
}

impl From<QueryRejection> for ProviderError {
    fn from(rejection: QueryRejection) -> Self {
        ProviderError::InvalidQuery(rejection.body_text())
    }
}

impl From<JsonRejection> for ProviderError {
    fn from(rejection: JsonRejection) -> Self {
        ProviderError::InvalidBody(rejection.body_text())
    }
}
