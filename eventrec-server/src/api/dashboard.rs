//! Dashboard counts

use axum::{extract::State, Json};
use eventrec_common::dashboard::{summarize, DashboardSummary};

use crate::AppState;

/// GET /api/dashboard
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    let events = state.repository.snapshot().await;
    let taxonomy = state.taxonomy.read().await;
    Json(summarize(&events, &taxonomy))
}
