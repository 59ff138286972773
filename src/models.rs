use crate::validation::{validate_submission, SchoolForm};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// One row of the school listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolSummary {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSchoolResponse {
    pub id: i64,
    pub message: String,
}

/// An uploaded image as received from (or sent in) a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// What the submitting side sends: the text fields plus the image.
#[derive(Debug, Clone)]
pub struct SchoolSubmission {
    pub form: SchoolForm,
    pub image: Option<ImageUpload>,
}

impl SchoolSubmission {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_submission(&self.form, self.image.as_slice())
    }
}
