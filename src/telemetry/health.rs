use super::monitor::HealthStatus;
use crate::appstate::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::json;
use std::time::Instant;

/// Recent error entries included in the report under `app_errors`.
const APP_ERRORS_SHOWN: usize = 10;

/// Full report. Runs every check before answering; 503 when any is unhealthy.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    tracing::trace!("received health check request");

    state.monitor.run_health_checks().await;
    let report = state.monitor.report();
    let overall = report.health.overall;

    let body = json!({
        "status": overall,
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": report.metrics.uptime_ms / 1000,
        "checks": report.health.checks,
        "errors": report.metrics.errors,
        "app_errors": state.errors.latest(APP_ERRORS_SHOWN),
        "performance": report.performance,
        "response_time_ms": start.elapsed().as_millis() as u64,
    });

    tracing::info!(
        "health check completed in {:?}, status: {}",
        start.elapsed(),
        overall.as_str()
    );

    let status = if overall == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status, Json(body))
}

pub async fn readiness_check() -> impl IntoResponse {
    tracing::trace!("received readiness check request");
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "OK")
}

pub async fn liveness_check() -> StatusCode {
    tracing::trace!("received liveness check request");
    StatusCode::NO_CONTENT
}
