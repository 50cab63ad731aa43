//! Event CRUD

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use eventrec_common::{Event, EventDraft, EventId};
use tracing::info;

use super::{ApiError, EditorSession};
use crate::AppState;

/// GET /api/events
///
/// Display order (insertion order).
pub async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.repository.snapshot().await)
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<Event>, ApiError> {
    state
        .repository
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// POST /api/events
///
/// Validates the draft, allocates the id and returns the created record.
pub async fn create_event(
    State(state): State<AppState>,
    EditorSession(session): EditorSession,
    Json(draft): Json<EventDraft>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let validated = draft.validate()?;
    let event = state.repository.add_new(validated).await?;
    info!("{} created event {} '{}'", session.username, event.id, event.title);
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events/:id
///
/// Full replacement; the path id wins over any id in the body.
pub async fn update_event(
    State(state): State<AppState>,
    EditorSession(session): EditorSession,
    Path(id): Path<EventId>,
    Json(draft): Json<EventDraft>,
) -> Result<Json<Event>, ApiError> {
    let event = draft.validate()?.with_id(id);
    if !state.repository.update(event.clone()).await {
        return Err(not_found(id));
    }
    info!("{} updated event {}", session.username, id);
    Ok(Json(event))
}

/// DELETE /api/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    EditorSession(session): EditorSession,
    Path(id): Path<EventId>,
) -> Result<StatusCode, ApiError> {
    if !state.repository.delete(id).await {
        return Err(not_found(id));
    }
    info!("{} deleted event {}", session.username, id);
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: EventId) -> ApiError {
    ApiError::NotFound(format!("Event {} not found", id))
}
