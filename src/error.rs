//! Error types for the attendance service

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Failures of an attendance store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing medium could not be reached, read or written
    #[error("Attendance storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored content exists but does not decode into attendance records
    #[error("Attendance storage holds corrupt data: {0}")]
    CorruptData(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::StorageUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::CorruptData(e.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => StoreError::CorruptData(e.to_string()),
            other => StoreError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Errors surfaced by the attendance resolver and its endpoints
#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Rejected input, e.g. a blank employee id
    #[error("{0}")]
    Validation(String),

    /// A record with the same `{employee}_{millis}` id already exists
    #[error("Duplicate submission for record {0}")]
    DuplicateSubmission(String),
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::Store(StoreError::StorageUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AttendanceError::Store(StoreError::CorruptData(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AttendanceError::Validation(_) => StatusCode::BAD_REQUEST,
            AttendanceError::DuplicateSubmission(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // storage details stay in the logs
        let message = match self {
            AttendanceError::Store(StoreError::StorageUnavailable(_)) => {
                "Attendance storage is unavailable".to_string()
            }
            AttendanceError::Store(StoreError::CorruptData(_)) => {
                "Something went wrong, Contact with system admin".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

pub type Result<T> = std::result::Result<T, AttendanceError>;
