//! HTTP API of the evacuation routing service

mod error;
mod routes;

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Limits applied to every request
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub timeout: Duration,
    pub concurrency: usize,
}

/// Builds the application router with all middleware attached
pub fn router(state: AppState, limits: RequestLimits) -> Router {
    let api = Router::new()
        .route("/evac/route", get(routes::evac_route))
        .route("/admin/reload-roads", post(routes::reload_roads))
        .route("/admin/set-test-flood-rect", post(routes::set_test_flood_rect))
        .route("/debug/flood-geojson", get(routes::flood_geojson));

    Router::new()
        .nest("/api", api)
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(limits.timeout))
                .layer(ConcurrencyLimitLayer::new(limits.concurrency)),
        )
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<Elapsed>() {
        (StatusCode::GATEWAY_TIMEOUT, "request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled middleware error: {err}"),
        )
    }
}
