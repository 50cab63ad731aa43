//! Server-Sent Events (SSE) utilities
//!
//! Streams [`Notification`]s from a [`NotificationBus`] to HTTP clients.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::notify::NotificationBus;

/// SSE stream of notifications
///
/// Sends a `ConnectionStatus` event first, then one event per notification
/// (event name = notification kind, data = JSON). Heartbeat comments keep idle
/// connections open.
pub fn create_notification_sse_stream(
    bus: &NotificationBus,
    service_name: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} notifications", service_name);
    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(notification) => {
                    match serde_json::to_string(&notification) {
                        Ok(json) => {
                            yield Ok(Event::default().event(notification.kind()).data(json))
                        }
                        Err(e) => warn!("SSE: cannot encode {}: {}", notification.kind(), e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("SSE: client lagged, {} notification(s) dropped", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("SSE: {} notification bus closed", service_name);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
