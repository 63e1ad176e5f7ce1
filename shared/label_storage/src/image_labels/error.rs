//! Error types for image label storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{get_item::GetItemError, put_item::PutItemError};
use thiserror::Error;

/// Result type for image label storage operations
pub type LabelStorageResult<T> = Result<T, LabelStorageError>;

/// Errors that can occur during image label storage operations
#[derive(Error, Debug)]
pub enum LabelStorageError {
    /// Failed to put annotation record into Dynamo DB
    #[error("Failed to put image labels into DynamoDB: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get annotation record from Dynamo DB
    #[error("Failed to get image labels from DynamoDB: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Stored item does not have the expected shape
    #[error("Malformed image labels item: {0}")]
    MalformedItem(String),

    /// Storage backend could not be reached
    #[error("Label storage unavailable: {0}")]
    Unavailable(String),
}
