use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use thiserror::Error;

use crate::calendar::MonthError;
use crate::models::{ErrorBody, RecordKind};

/// Failures raised by a `RecordStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt stored record: {0}")]
    Corrupt(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Everything a handler can fail with. Each variant maps to one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Month(#[from] MonthError),
    #[error("{kind} not found")]
    NotFound { kind: RecordKind, id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) | ApiError::InvalidId(_) | ApiError::Month(_) => {
                Status::BadRequest
            }
            ApiError::NotFound { .. } => Status::NotFound,
            ApiError::Store(_) => Status::InternalServerError,
        }
    }

    /// Message sent to the caller. Internal details stay in the server log.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Store(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        match &self {
            ApiError::Store(source) => {
                tracing::error!(error = %source, uri = %request.uri(), "request failed");
            }
            ApiError::NotFound { kind, id } => {
                tracing::debug!(%kind, %id, "record not found");
            }
            other => tracing::debug!(error = %other, "rejected request"),
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).respond_to(request)
    }
}
