//! Validation rules for school submissions.
//!
//! The same rules run in [`crate::client::SchoolClient`] before anything is
//! sent and in the creation handler after the multipart form is read.

use crate::models::ImageUpload;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

static CONTACT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

/// Text portion of a school submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SchoolForm {
    #[validate(length(min = 3, message = "School name must be at least 3 characters."))]
    pub name: String,

    #[validate(length(min = 5, message = "Address is required."))]
    pub address: String,

    #[validate(length(min = 2, message = "City is required."))]
    pub city: String,

    #[validate(length(min = 2, message = "State is required."))]
    pub state: String,

    #[validate(regex(path = *CONTACT_RE, message = "Contact must be a 10-digit number."))]
    pub contact: String,

    #[validate(email(message = "Invalid email address."))]
    pub email_id: String,
}

/// Check the uploaded files for the `image` field: exactly one, small enough,
/// and of a supported type.
pub fn validate_image(images: &[ImageUpload]) -> Result<(), ValidationError> {
    let image = match images {
        [image] => image,
        _ => return Err(image_error("required", "Image is required.")),
    };

    if image.data.len() > MAX_IMAGE_BYTES {
        return Err(image_error("size", "Max file size is 5MB."));
    }

    let supported = image
        .content_type
        .as_deref()
        .map(|ct| ALLOWED_IMAGE_TYPES.contains(&ct))
        .unwrap_or(false);

    if !supported {
        return Err(image_error(
            "mime_type",
            "Only .jpg, .png, and .webp formats are supported.",
        ));
    }

    Ok(())
}

/// Validate a complete submission, collecting every field-level violation.
pub fn validate_submission(
    form: &SchoolForm,
    images: &[ImageUpload],
) -> Result<(), ValidationErrors> {
    let mut errors = match form.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    if let Err(err) = validate_image(images) {
        errors.add("image", err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn image_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}
