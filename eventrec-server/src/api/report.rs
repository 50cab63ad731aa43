//! Report filtering and export

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use eventrec_common::filter::{filter_events, FilterOutcome, ReportCriteria};
use eventrec_common::notify::Notification;
use eventrec_common::report::ExportSummary;
use eventrec_common::session::Session;
use eventrec_common::{Error, EventId};
use serde::Deserialize;
use tracing::info;

use super::ApiError;
use crate::AppState;

/// GET /api/report
///
/// Query keys: `startDate`, `endDate` (YYYY-MM-DD), `coordinator`, `venue`,
/// `department`. All optional; combined with AND.
pub async fn report(
    State(state): State<AppState>,
    Query(criteria): Query<ReportCriteria>,
) -> Json<FilterOutcome> {
    let events = state.repository.snapshot().await;
    Json(filter_events(&events, &criteria))
}

/// Body of POST /api/report/export
///
/// `eventId` exports that single record; otherwise every record matching
/// `criteria` (or all records) goes into one combined report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportRequest {
    pub criteria: Option<ReportCriteria>,
    #[serde(alias = "event_id")]
    pub event_id: Option<EventId>,
}

/// POST /api/report/export
///
/// Allowed for every role.
pub async fn export_report(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportSummary>, ApiError> {
    let result = match request.event_id {
        Some(id) => export_single(&state, id).await,
        None => export_matching(&state, request.criteria.unwrap_or_default()).await,
    };

    let bus = state.notifications();
    match result {
        Ok(summary) => {
            info!(
                "{} exported {} event(s) to {}",
                session.username,
                summary.exported,
                summary.path.display()
            );
            let description = if request.event_id.is_some() {
                "Report generated successfully"
            } else {
                "All reports generated successfully"
            };
            bus.emit_lossy(Notification::success("Success", description));
            Ok(Json(summary))
        }
        Err(e) => {
            let description = match &e {
                ApiError::NotFound(_) => "Event not found",
                ApiError::BadRequest(msg) => msg.as_str(),
                _ => "Failed to generate report",
            };
            bus.emit_lossy(Notification::error("Error", description));
            Err(e)
        }
    }
}

async fn export_single(state: &AppState, id: EventId) -> Result<ExportSummary, ApiError> {
    let event = state
        .repository
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Event {} not found", id)))?;

    let exporter = state.exporter.clone();
    let path = tokio::task::spawn_blocking(move || exporter.export_event(&event))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(ExportSummary {
        path,
        exported: 1,
        failures: Vec::new(),
    })
}

async fn export_matching(
    state: &AppState,
    criteria: ReportCriteria,
) -> Result<ExportSummary, ApiError> {
    let events = state.repository.snapshot().await;
    let outcome = filter_events(&events, &criteria);
    if outcome.events.is_empty() {
        return Err(Error::ValidationFailed("No events to generate report from".to_string()).into());
    }

    let exporter = state.exporter.clone();
    let summary = tokio::task::spawn_blocking(move || exporter.export_all(&outcome.events))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(summary)
}
