use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("Invalid school record: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Image storage failed: {cause}")]
    Storage { cause: String },

    #[error("Connection to {database} failed while {operation}: {cause}")]
    ConnectionFailed {
        operation: &'static str,
        database: String,
        cause: String,
    },

    #[error("Query failed while {operation}: {cause}")]
    QueryFailed {
        operation: &'static str,
        cause: String,
    },
}

impl DirectoryError {
    pub fn storage(cause: impl ToString) -> Self {
        DirectoryError::Storage {
            cause: cause.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DirectoryError::MissingFields { .. }
            | DirectoryError::Validation(_)
            | DirectoryError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            DirectoryError::Storage { .. }
            | DirectoryError::ConnectionFailed { .. }
            | DirectoryError::QueryFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_response = match &self {
            DirectoryError::MissingFields { .. } => ErrorResponse {
                message: "Missing required fields".to_string(),
                error: None,
                errors: None,
            },
            DirectoryError::Validation(errors) => ErrorResponse {
                message: "Invalid school record".to_string(),
                error: None,
                errors: serde_json::to_value(errors).ok(),
            },
            DirectoryError::InvalidRequest { message } => ErrorResponse {
                message: message.clone(),
                error: None,
                errors: None,
            },
            DirectoryError::Storage { cause } => ErrorResponse {
                message: "Error storing school image".to_string(),
                error: Some(cause.clone()),
                errors: None,
            },
            DirectoryError::ConnectionFailed {
                operation, cause, ..
            } => ErrorResponse {
                message: format!("Error {}", operation),
                error: Some(cause.clone()),
                errors: None,
            },
            DirectoryError::QueryFailed { operation, cause } => ErrorResponse {
                message: format!("Error {}", operation),
                error: Some(cause.clone()),
                errors: None,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<std::io::Error> for DirectoryError {
    fn from(err: std::io::Error) -> Self {
        DirectoryError::Storage {
            cause: format!("IO error: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
