//! Error types for the image labeler

use label_storage::image_labels::LabelStorageError;
use thiserror::Error;

/// Result type for image labeler operations
pub type LabelerResult<T> = Result<T, LabelerError>;

/// Errors that abort labelling an S3 event
///
/// Vision failures are not listed here: a failing analysis only empties its own facet.
#[derive(Error, Debug)]
pub enum LabelerError {
    /// The notification carried no records
    #[error("S3 event contains no records")]
    NoRecords,

    /// A record has no bucket name
    #[error("S3 event record is missing the bucket name")]
    MissingBucket,

    /// A record has no object key
    #[error("S3 event record is missing the object key")]
    MissingKey,

    /// The object key does not decode to UTF-8
    #[error("Invalid object key {0:?}")]
    InvalidKey(String),

    /// Persisting the annotation record failed
    #[error(transparent)]
    Storage(#[from] LabelStorageError),
}
