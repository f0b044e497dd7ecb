//! Cloudinary upload API client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{multipart, Client};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{MediaError, MediaFolder, MediaStore, StoredMedia, UploadFile};
use crate::config::MediaSettings;
use crate::infrastructure::metrics;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    resource_type: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Signed-upload client for one Cloudinary cloud.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: Client,
    settings: MediaSettings,
}

impl CloudinaryStore {
    pub fn new(settings: MediaSettings) -> Result<Self, MediaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        Ok(Self { client, settings })
    }

    fn ensure_configured(&self) -> Result<(), MediaError> {
        if self.settings.cloud_name.is_empty()
            || self.settings.api_key.is_empty()
            || self.settings.api_secret.is_empty()
        {
            return Err(MediaError::NotConfigured);
        }
        Ok(())
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.cloud_name,
            resource_type,
            action
        )
    }

    async fn read_error(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => "unexpected response".into(),
        };
        MediaError::Rejected { status, message }
    }

    async fn send_upload(&self, folder: MediaFolder, file: UploadFile) -> Result<StoredMedia, MediaError> {
        self.ensure_configured()?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.settings.api_secret,
        );

        let mut part = multipart::Part::bytes(file.bytes.to_vec()).file_name(file.file_name);
        if let Some(mime) = file.content_type.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|e| MediaError::Transport(e.to_string()))?;
        }

        let form = multipart::Form::new()
            .text("api_key", self.settings.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.as_str())
            .text("signature", signature)
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint(folder.resource_type(), "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        Ok(StoredMedia {
            url: body.secure_url,
            public_id: body.public_id,
            resource_type: body.resource_type,
        })
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, folder: MediaFolder, file: UploadFile) -> Result<StoredMedia, MediaError> {
        let file_name = file.file_name.clone();
        let result = self.send_upload(folder, file).await;

        metrics::record_media_upload(folder.as_str(), result.is_ok());
        match &result {
            Ok(media) => tracing::debug!(folder = folder.as_str(), public_id = %media.public_id, "Uploaded {}", file_name),
            Err(e) => tracing::warn!(folder = folder.as_str(), "Upload of {} failed: {}", file_name, e),
        }
        result
    }

    async fn destroy(&self, media: &StoredMedia) -> Result<(), MediaError> {
        self.ensure_configured()?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", media.public_id.as_str()), ("timestamp", timestamp.as_str())],
            &self.settings.api_secret,
        );

        let params = [
            ("public_id", media.public_id.clone()),
            ("timestamp", timestamp),
            ("api_key", self.settings.api_key.clone()),
            ("signature", signature),
        ];

        let response = self
            .client
            .post(self.endpoint(&media.resource_type, "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }
        Ok(())
    }
}

/// Cloudinary request signature: the signed parameters sorted by name,
/// joined as `k=v&k=v`, with the API secret appended, SHA-1, hex.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
