//! HTTP client for the directory API.
//!
//! Submissions are checked against the same rules the server applies before
//! any request goes out, so an invalid record never reaches the network.

use crate::models::{AddSchoolResponse, ImageUpload, SchoolSubmission, SchoolSummary};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid school record: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message} ({status})")]
    Rejected { status: StatusCode, message: String },

    #[error("Cannot read image {path}: {cause}")]
    InvalidImage { path: String, cause: String },
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

pub struct SchoolClient {
    http: reqwest::Client,
    base_url: String,
}

impl SchoolClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn add_school(
        &self,
        submission: &SchoolSubmission,
    ) -> Result<AddSchoolResponse, ClientError> {
        submission.validate()?;

        let form = build_form(submission)?;

        debug!("Submitting school {}", submission.form.name);
        let response = self
            .http
            .post(self.url("/api/addSchool"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "Something went wrong").await);
        }

        Ok(response.json().await?)
    }

    pub async fn list_schools(&self) -> Result<Vec<SchoolSummary>, ClientError> {
        let response = self.http.get(self.url("/api/getSchools")).send().await?;

        if !response.status().is_success() {
            return Err(rejection(
                response,
                "Failed to fetch schools. Please try again later.",
            )
            .await);
        }

        Ok(response.json().await?)
    }
}

fn build_form(submission: &SchoolSubmission) -> Result<Form, ClientError> {
    let school = &submission.form;
    let mut form = Form::new()
        .text("name", school.name.clone())
        .text("address", school.address.clone())
        .text("city", school.city.clone())
        .text("state", school.state.clone())
        .text("contact", school.contact.clone())
        .text("email_id", school.email_id.clone());

    if let Some(image) = &submission.image {
        let mut part = Part::bytes(image.data.clone()).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            part = part.mime_str(content_type)?;
        }
        form = form.part("image", part);
    }

    Ok(form)
}

async fn rejection(response: reqwest::Response, fallback: &str) -> ClientError {
    let status = response.status();
    let message = response
        .json::<MessageBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| fallback.to_string());

    ClientError::Rejected { status, message }
}

/// Load an image from disk, guessing its MIME type from the extension.
pub fn load_image(path: &Path) -> Result<ImageUpload, ClientError> {
    let data = std::fs::read(path).map_err(|e| ClientError::InvalidImage {
        path: path.display().to_string(),
        cause: e.to_string(),
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();

    Ok(ImageUpload {
        content_type: guess_content_type(&file_name).map(str::to_string),
        file_name,
        data,
    })
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
