//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cache::CacheStatus;
use crate::feed::FeedSource;

use super::dto::BusDataResponse;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S: FeedSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/bus",
            get(bus_data::<S>).fallback(method_not_allowed),
        )
        .route("/api/bus/status", get(cache_status::<S>))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browsers may read the feed from any origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Current bus records. Always answers with a well-formed envelope.
async fn bus_data<S: FeedSource>(State(state): State<AppState<S>>) -> Json<BusDataResponse> {
    let data = state.feed.get_bus_data().await;
    info!(
        source = ?data.source,
        records = data.records.len(),
        errors = data.errors.len(),
        "bus data requested"
    );
    Json(BusDataResponse::from(data))
}

/// Cache slot status, for monitoring.
async fn cache_status<S: FeedSource>(State(state): State<AppState<S>>) -> Json<CacheStatus> {
    Json(state.feed.status().await)
}

/// Any method other than GET on the bus endpoint.
async fn method_not_allowed(method: Method) -> Response {
    let body = BusDataResponse::rejected(format!("method {method} not allowed; use GET"));
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET")],
        Json(body),
    )
        .into_response()
}
