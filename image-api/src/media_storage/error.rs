//! Error types for bucket operations

use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    operation::list_objects_v2::ListObjectsV2Error,
};
use thiserror::Error;

/// Result type for bucket operations
pub type BucketResult<T> = Result<T, BucketError>;

/// Errors that can occur during bucket operations
#[derive(Error, Debug)]
pub enum BucketError {
    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<SdkError<ListObjectsV2Error>> for BucketError {
    fn from(error: SdkError<ListObjectsV2Error>) -> Self {
        Self::S3Error(DisplayErrorContext(&error).to_string())
    }
}
