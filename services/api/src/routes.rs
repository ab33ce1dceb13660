use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use hiring_desk::workflows::recruiting::{recruiting_router, RecruitingService, SnapshotGateway};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Recruiting API plus the operational probes every deployment exposes.
pub(crate) fn with_recruiting_routes<G>(
    service: Arc<RecruitingService<G>>,
    default_actor: &str,
) -> Router
where
    G: SnapshotGateway + 'static,
{
    recruiting_router(service, default_actor)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
