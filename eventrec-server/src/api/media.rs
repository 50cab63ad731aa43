//! Media upload proxy
//!
//! The browser sends the file as base64 JSON; the server forwards the bytes to
//! the configured upload host and returns a `url` media item that can be put
//! on an event.

use axum::{extract::State, Json};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use eventrec_common::media::MediaItem;
use eventrec_common::notify::Notification;
use serde::Deserialize;
use tracing::info;

use super::{ApiError, EditorSession};
use crate::AppState;

/// Request body cap for uploads; base64 inflates a 5 MiB file to under 7 MiB
pub const MEDIA_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Base64 payload (a `data:` URL prefix is tolerated)
    pub data: String,
}

/// POST /api/media
pub async fn upload_media(
    State(state): State<AppState>,
    EditorSession(session): EditorSession,
    Json(request): Json<UploadRequest>,
) -> Result<Json<MediaItem>, ApiError> {
    let payload = match request.data.split_once(";base64,") {
        Some((_, encoded)) => encoded,
        None => request.data.as_str(),
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ApiError::BadRequest(format!("data is not valid base64: {}", e)))?;

    let bus = state.notifications();
    match state
        .uploader
        .upload(&request.name, &request.mime_type, bytes)
        .await
    {
        Ok(url) => {
            info!("{} uploaded '{}' to {}", session.username, request.name, url);
            bus.emit_lossy(Notification::success("Success", "Media files uploaded successfully"));
            Ok(Json(MediaItem::remote(request.name, request.mime_type, url)))
        }
        Err(e) => {
            bus.emit_lossy(Notification::error("Error", "Failed to upload file"));
            Err(e.into())
        }
    }
}
