//! Universal error handling for the API

use aws_sdk_dynamodb::error::DisplayErrorContext;
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use label_storage::image_labels::LabelStorageError;
use serde::Serialize;

use crate::media_storage::BucketError;

/// Message returned when the upload bucket already holds too many images
pub const CAPACITY_EXCEEDED_MESSAGE: &str =
    "Maximum images in S3 bucket reached, come back later after it's emptied.";

/// JSON body of an error response
///
/// Expected outcomes (missing records) carry a `message`, failures carry an `error`.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ErrorBody {
    /// Failure description
    Error {
        /// Human-readable error message
        error: String,
    },
    /// Informational message
    Message {
        /// Human-readable message
        message: String,
    },
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    body: ErrorBody,
}

impl AppError {
    /// Create a new application error with an `error` body
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::Error {
                error: error.into(),
            },
        }
    }

    /// Generic internal error carrying the underlying message for diagnostics
    #[must_use]
    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// The upload bucket is full
    #[must_use]
    pub fn capacity_exceeded() -> Self {
        Self::new(StatusCode::FORBIDDEN, CAPACITY_EXCEEDED_MESSAGE)
    }

    /// The requested resource does not exist
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody::Message {
                message: message.into(),
            },
        }
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Body of the response
    #[must_use]
    pub const fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match (&self.body, self.status.as_u16()) {
            (ErrorBody::Message { message }, _) => tracing::info!("{} - {message}", self.status),
            (ErrorBody::Error { error }, 400..=499) => {
                tracing::warn!("Client error: {} - {error}", self.status);
            }
            (ErrorBody::Error { error }, _) => {
                tracing::error!("Server error: {} - {error}", self.status);
            }
        }

        (self.status, Json(self.body)).into_response()
    }
}

/// Convert bucket errors to application errors
impl From<BucketError> for AppError {
    fn from(err: BucketError) -> Self {
        Self::internal(err.to_string())
    }
}

/// Unparseable query strings get the same JSON 500 as any other failure
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::internal(rejection.body_text())
    }
}

/// Convert label storage errors to application errors
impl From<LabelStorageError> for AppError {
    fn from(err: LabelStorageError) -> Self {
        Self::internal(DisplayErrorContext(&err).to_string())
    }
}
