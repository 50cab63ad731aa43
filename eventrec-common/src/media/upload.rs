//! Remote media upload boundary
//!
//! Uploads go to an anonymous file host that answers a multipart POST with the
//! public URL as plain text. Failures are surfaced to the caller as
//! [`Error::UploadFailed`]; nothing is retried.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Default anonymous file host
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://0x0.st";

/// Upload size ceiling (5 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Transfers a file somewhere publicly reachable and returns its URL
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<String>;
}

/// Multipart HTTP uploader
pub struct HttpUploader {
    endpoint: String,
    max_bytes: usize,
    client: reqwest::Client,
}

impl HttpUploader {
    pub fn new(endpoint: impl Into<String>, max_bytes: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::UploadFailed(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            max_bytes,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MediaUploader for HttpUploader {
    async fn upload(&self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<String> {
        if bytes.len() > self.max_bytes {
            return Err(Error::UploadFailed(format!(
                "'{}' is {} bytes, limit is {}",
                name,
                bytes.len(),
                self.max_bytes
            )));
        }

        debug!("Uploading '{}' ({}, {} bytes) to {}", name, mime_type, bytes.len(), self.endpoint);

        let part = Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(mime_type)
            .map_err(|e| Error::UploadFailed(format!("invalid MIME type '{}': {}", mime_type, e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                Error::UploadFailed(format!("request to {} failed: {}", self.endpoint, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upload of '{}' rejected with status {}", name, status);
            return Err(Error::UploadFailed(format!("file host returned {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::UploadFailed(format!("reading response: {}", e)))?;

        let url = body.trim();
        if url.is_empty() {
            return Err(Error::UploadFailed("file host returned an empty URL".to_string()));
        }

        Ok(url.to_string())
    }
}
