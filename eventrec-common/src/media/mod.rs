//! Media items attached to event records
//!
//! A media item is owned by exactly one event and carries its bytes either
//! inline (a `data:` URL) or by reference (a remote URL returned by the upload
//! collaborator). Preview dispatch is driven by the MIME type prefix.

mod upload;

pub use upload::{HttpUploader, MediaUploader, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOAD_ENDPOINT};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Where the bytes of a media item live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaContent {
    /// Self-contained `data:<mime>;base64,<payload>` URL
    Data(String),
    /// Location to fetch the bytes from
    Url(String),
}

/// One file attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MediaItemRecord", into = "MediaItemRecord")]
pub struct MediaItem {
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    /// Display name (usually the original file name)
    pub name: String,
    pub content: MediaContent,
}

/// How a media item should be previewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Video,
    Audio,
    Pdf,
    File,
}

impl PreviewKind {
    /// Dispatch on MIME type: `image/`, `video/`, `audio/` prefixes and the
    /// exact `application/pdf`; everything else is a generic file.
    pub fn for_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            PreviewKind::Image
        } else if mime.starts_with("video/") {
            PreviewKind::Video
        } else if mime.starts_with("audio/") {
            PreviewKind::Audio
        } else if mime == "application/pdf" {
            PreviewKind::Pdf
        } else {
            PreviewKind::File
        }
    }
}

impl MediaItem {
    /// Media item referencing an uploaded file
    pub fn remote(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            name: name.into(),
            content: MediaContent::Url(url.into()),
        }
    }

    /// Media item carrying its bytes inline as a base64 `data:` URL
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        let mime_type = mime_type.into();
        let data = format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes));
        Self {
            mime_type,
            name: name.into(),
            content: MediaContent::Data(data),
        }
    }

    pub fn preview_kind(&self) -> PreviewKind {
        PreviewKind::for_mime(&self.mime_type)
    }

    /// URL suitable for an `src`/`href` attribute (data URL or remote URL)
    pub fn source(&self) -> &str {
        match &self.content {
            MediaContent::Data(data) => data,
            MediaContent::Url(url) => url,
        }
    }

    /// Decode inline bytes
    ///
    /// Fails for remote items and for data URLs that are not base64 encoded.
    pub fn decode_data(&self) -> Result<Vec<u8>> {
        let data = match &self.content {
            MediaContent::Data(data) => data,
            MediaContent::Url(url) => {
                return Err(Error::ValidationFailed(format!(
                    "media '{}' is stored remotely at {}",
                    self.name, url
                )))
            }
        };

        let (header, payload) = data
            .split_once(',')
            .ok_or_else(|| {
                Error::ValidationFailed(format!("media '{}' has a malformed data URL", self.name))
            })?;
        if !header.starts_with("data:") || !header.ends_with(";base64") {
            return Err(Error::ValidationFailed(format!(
                "media '{}' data URL is not base64 encoded",
                self.name
            )));
        }

        STANDARD
            .decode(payload)
            .map_err(|e| Error::ValidationFailed(format!("media '{}' payload: {}", self.name, e)))
    }
}

/// Persisted/wire shape: `{type, name, data}` or `{type, name, url}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MediaItemRecord {
    #[serde(rename = "type", default)]
    mime_type: String,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl TryFrom<MediaItemRecord> for MediaItem {
    type Error = String;

    fn try_from(record: MediaItemRecord) -> std::result::Result<Self, Self::Error> {
        // Inline payload wins when a record carries both
        let content = match (record.data, record.url) {
            (Some(data), _) => MediaContent::Data(data),
            (None, Some(url)) => MediaContent::Url(url),
            (None, None) => {
                return Err(format!("media item '{}' has neither data nor url", record.name))
            }
        };
        Ok(MediaItem {
            mime_type: record.mime_type,
            name: record.name,
            content,
        })
    }
}

impl From<MediaItem> for MediaItemRecord {
    fn from(item: MediaItem) -> Self {
        let (data, url) = match item.content {
            MediaContent::Data(data) => (Some(data), None),
            MediaContent::Url(url) => (None, Some(url)),
        };
        MediaItemRecord {
            mime_type: item.mime_type,
            name: item.name,
            data,
            url,
        }
    }
}
