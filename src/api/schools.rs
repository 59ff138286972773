use super::AppState;
use crate::error::{DirectoryError, Result};
use crate::models::{AddSchoolResponse, ImageUpload, SchoolSummary};
use crate::validation::{validate_submission, SchoolForm};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fields as read off the wire, before the presence check.
#[derive(Debug, Default)]
struct RawSubmission {
    name: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    contact: Option<String>,
    email_id: Option<String>,
    images: Vec<ImageUpload>,
}

impl RawSubmission {
    fn into_parts(self) -> Result<(SchoolForm, Vec<ImageUpload>)> {
        let mut missing = Vec::new();
        let mut take = |value: Option<String>, field: &'static str| {
            value.unwrap_or_else(|| {
                missing.push(field);
                String::new()
            })
        };

        let form = SchoolForm {
            name: take(self.name, "name"),
            address: take(self.address, "address"),
            city: take(self.city, "city"),
            state: take(self.state, "state"),
            contact: take(self.contact, "contact"),
            email_id: take(self.email_id, "email_id"),
        };

        if self.images.is_empty() {
            missing.push("image");
        }

        if !missing.is_empty() {
            return Err(DirectoryError::MissingFields { fields: missing });
        }

        Ok((form, self.images))
    }
}

async fn read_submission(mut multipart: Multipart) -> Result<RawSubmission> {
    let mut raw = RawSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        DirectoryError::InvalidRequest {
            message: format!("Failed to parse multipart form: {}", e),
        }
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "image" {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().map(|ct| ct.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| DirectoryError::InvalidRequest {
                    message: format!("Failed to read image file: {}", e),
                })?;

            // Browsers send an empty part when no file was chosen
            if file_name.is_empty() && data.is_empty() {
                continue;
            }

            raw.images.push(ImageUpload {
                file_name,
                content_type,
                data: data.to_vec(),
            });
            continue;
        }

        let slot = match name.as_str() {
            "name" => &mut raw.name,
            "address" => &mut raw.address,
            "city" => &mut raw.city,
            "state" => &mut raw.state,
            "contact" => &mut raw.contact,
            "email_id" => &mut raw.email_id,
            _ => {
                warn!("Unknown field in multipart: {}", name);
                continue;
            }
        };

        let text = field
            .text()
            .await
            .map_err(|e| DirectoryError::InvalidRequest {
                message: format!("Failed to read {} field: {}", name, e),
            })?;

        if !text.is_empty() {
            *slot = Some(text);
        }
    }

    Ok(raw)
}

async fn create_school(state: &AppState, multipart: Multipart) -> Result<i64> {
    let (form, images) = read_submission(multipart).await?.into_parts()?;

    validate_submission(&form, &images)?;

    let image = &images[0];
    let stored = state.images.store(image).await?;

    match state.schools.insert(&form, &stored.reference).await {
        Ok(id) => {
            info!("Added school {} ({}) with image {}", id, form.name, stored.reference);
            Ok(id)
        }
        Err(e) => {
            // Undo the store so the image is not left without a record
            if let Err(remove_err) = state.images.remove(&stored).await {
                warn!(
                    "Failed to remove orphaned image {}: {}",
                    stored.handle, remove_err
                );
            }
            Err(e)
        }
    }
}

pub async fn add_school(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let id = create_school(&state, multipart).await.map_err(|e| {
        if e.status().is_client_error() {
            warn!("Rejected school submission: {}", e);
        } else {
            error!("Failed to add school: {}", e);
        }
        e
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AddSchoolResponse {
            id,
            message: "School added successfully".to_string(),
        }),
    ))
}

pub async fn get_schools(State(state): State<Arc<AppState>>) -> Result<Json<Vec<SchoolSummary>>> {
    let schools = state.schools.list().await.map_err(|e| {
        error!("Failed to fetch schools: {}", e);
        e
    })?;

    Ok(Json(schools))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> RawSubmission {
        RawSubmission {
            name: Some("Green Valley High".to_string()),
            address: Some("123 Main St".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            contact: Some("1234567890".to_string()),
            email_id: Some("a@b.com".to_string()),
            images: vec![ImageUpload {
                file_name: "valid.jpg".to_string(),
                content_type: Some("image/jpeg".to_string()),
                data: vec![1, 2, 3],
            }],
        }
    }

    #[test]
    fn test_complete_submission_has_all_parts() {
        let (form, images) = complete().into_parts().unwrap();
        assert_eq!(form.name, "Green Valley High");
        assert_eq!(form.email_id, "a@b.com");
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let raw = RawSubmission {
            email_id: None,
            contact: None,
            images: Vec::new(),
            ..complete()
        };

        match raw.into_parts() {
            Err(DirectoryError::MissingFields { fields }) => {
                assert_eq!(fields, vec!["contact", "email_id", "image"]);
            }
            other => panic!("expected missing fields, got {:?}", other.map(|(f, _)| f)),
        }
    }
}
