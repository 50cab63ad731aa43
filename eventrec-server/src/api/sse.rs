//! Server-Sent Events for notifications

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /api/notifications - SSE notification stream
///
/// Streams a `ConnectionStatus` event, then every notification (mutation
/// outcomes, snapshot changes, persist/load failures) named by its kind.
pub async fn notification_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    eventrec_common::sse::create_notification_sse_stream(state.notifications(), "eventrec-server")
}
