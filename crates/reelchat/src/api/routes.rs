//! Route definitions.

use axum::http::{Method, header};
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::AppState;

/// Create the application router.
///
/// `/health` reports liveness; every other path is the proxy, so the client
/// can mount it under whatever function path the deployment uses.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(handlers::health))
        .fallback(handlers::proxy)
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

/// Open CORS: the proxy is called from the marketing site's browser bundle.
/// The layer answers every `OPTIONS` preflight itself with 200.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
