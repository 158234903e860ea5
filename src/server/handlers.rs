use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{info, warn};
use serde_json::{json, Map, Value};

use super::AppState;
use crate::analytics;
use crate::dataset;
use crate::error::{CIForecastError, Result};
use crate::gateway::{GatewayHealth, PredictionRequest, PredictionResult, TestSuites};
use crate::insights::DashboardInsights;

/// Runs blocking dataset work off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CIForecastError::SourceUnreadable(format!("Dataset task failed: {e}")))?
}

pub async fn get_data(State(state): State<AppState>) -> Result<Json<Vec<Map<String, Value>>>> {
    let source = state.dataset.clone();
    let rows = run_blocking(move || dataset::load_rows(&source)).await?;

    info!("Serving {} dataset rows", rows.len());
    Ok(Json(rows))
}

pub async fn get_analytics(State(state): State<AppState>) -> Result<Json<DashboardInsights>> {
    let source = state.dataset.clone();
    let threshold = state.outlier_threshold;
    let insights = run_blocking(move || analytics::analyze_source(&source, threshold)).await?;

    Ok(Json(insights))
}

/// Falls back to the configured suite list when the scoring service cannot
/// answer, so the prediction form stays usable. The gateway itself makes no
/// such promise.
pub async fn get_test_suites(State(state): State<AppState>) -> Json<TestSuites> {
    match state.gateway.list_test_suites().await {
        Ok(suites) => Json(suites),
        Err(err) => {
            warn!("Serving fallback test suites: {err}");
            Json(state.fallback_test_suites.clone())
        }
    }
}

pub async fn get_features(State(state): State<AppState>) -> Response {
    match state.gateway.list_features().await {
        Ok(features) => Json(features).into_response(),
        Err(err) => {
            warn!("Features request failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Features service unavailable" })),
            )
                .into_response()
        }
    }
}

pub async fn get_health(State(state): State<AppState>) -> Json<GatewayHealth> {
    Json(state.gateway.health().await)
}

pub async fn post_predict(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>> {
    let Json(request) = payload.map_err(|e| CIForecastError::InvalidRequest(e.body_text()))?;

    info!(
        "Forwarding prediction for suite '{}' (pull request: {})",
        request.test_suite, request.is_pull_request
    );
    let result = state.gateway.predict(&request).await?;

    Ok(Json(result))
}
