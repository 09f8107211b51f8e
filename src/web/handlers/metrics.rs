use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::web::AppState;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus metrics endpoint handler
///
/// Renders the current value of every registered metric. Vehicle metrics
/// that were never published still appear, at their initial value.
pub async fn prometheus_metrics(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match state.metrics.encode_text() {
        Ok(output) => Ok((
            StatusCode::OK,
            [("content-type", CONTENT_TYPE)],
            output,
        )
            .into_response()),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
