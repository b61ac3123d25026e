//! Prometheus scrape endpoint for login, auth-rejection and health-check counters

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::state::MetricsHandle;

/// Routes exposing the storefront's recorder, mounted only when metrics are enabled
pub fn routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new()
        .route("/metrics", get(scrape))
        .with_state(handle)
}

/// GET /metrics - render the recorder in Prometheus text format
async fn scrape(State(recorder): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    recorder.render()
}
