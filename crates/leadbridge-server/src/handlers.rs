use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "LeadBridge",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

/// Inbound field-service webhook.
///
/// Always acknowledges with 200 and the structured processing report so the
/// source system's retry logic is not tripped by events the bridge chose
/// not to act on; retry policy for genuine failures belongs to the caller.
pub async fn webhook(State(state): State<AppState>, Json(payload): Json<Value>) -> impl IntoResponse {
    tracing::info!(
        event = payload.get("event").and_then(serde_json::Value::as_str).unwrap_or("<missing>"),
        company_id = payload.get("company_id").and_then(serde_json::Value::as_str).unwrap_or("<missing>"),
        "webhook received"
    );
    let report = state.engine.process(&payload).await;
    (StatusCode::OK, Json(report))
}
