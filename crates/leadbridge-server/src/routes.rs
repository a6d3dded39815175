use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Assemble the HTTP surface.
///
/// `POST /webhooks/fieldservice` is the single ingestion endpoint; the rest is
/// liveness plumbing for deployment probes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/webhooks/fieldservice", post(handlers::webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
