use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::web::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let now = Utc::now();
    Json(json!({
        "status": "healthy",
        "timestamp": now.to_rfc3339(),
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": (now - state.started_at).num_seconds(),
        "metrics_registered": state.metrics.len(),
    }))
}
