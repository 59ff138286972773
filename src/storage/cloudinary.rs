use super::{ImageStore, StoredImage};
use crate::config::CloudinaryConfig;
use crate::error::{DirectoryError, Result};
use crate::models::ImageUpload;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Signed uploads to the Cloudinary image API.
pub struct CloudinaryImageStore {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryImageStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        sign_params(params, &self.config.api_secret)
    }

    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DirectoryError::storage(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(DirectoryError::storage(error_message(status, &body)));
        }

        Ok(body)
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    fn kind(&self) -> &'static str {
        "cloudinary"
    }

    async fn store(&self, upload: &ImageUpload) -> Result<StoredImage> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("folder", self.config.folder.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let mut part = Part::bytes(upload.data.clone()).file_name(upload.file_name.clone());
        if let Some(content_type) = &upload.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| DirectoryError::storage(format!("Invalid content type: {}", e)))?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature);

        debug!(
            "Uploading {} ({} bytes) to folder {}",
            upload.file_name,
            upload.data.len(),
            self.config.folder
        );

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| DirectoryError::storage(format!("Upload request failed: {}", e)))?;

        let body = Self::read_body(response).await?;
        let uploaded = parse_upload(&body)?;

        info!("Uploaded image as {}", uploaded.public_id);

        Ok(StoredImage {
            reference: uploaded.secure_url,
            handle: uploaded.public_id,
        })
    }

    async fn remove(&self, stored: &StoredImage) -> Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", stored.handle.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", stored.handle.as_str()),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DirectoryError::storage(format!("Destroy request failed: {}", e)))?;

        let body = Self::read_body(response).await?;
        let destroyed: DestroyResponse = serde_json::from_str(&body)
            .map_err(|e| DirectoryError::storage(format!("Unexpected destroy response: {}", e)))?;

        if destroyed.result != "ok" {
            return Err(DirectoryError::storage(format!(
                "Destroy of {} returned '{}'",
                stored.handle, destroyed.result
            )));
        }

        debug!("Removed image {}", stored.handle);
        Ok(())
    }
}

/// SHA-256 over `k1=v1&k2=v2...` (keys sorted) with the secret appended.
fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn parse_upload(body: &str) -> Result<UploadResponse> {
    if let Ok(err) = serde_json::from_str::<ErrorBody>(body) {
        return Err(DirectoryError::storage(err.error.message));
    }

    serde_json::from_str(body)
        .map_err(|e| DirectoryError::storage(format!("Unexpected upload response: {}", e)))
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => format!("{} ({})", err.error.message, status),
        Err(_) => format!("Image service returned {}", status),
    }
}
