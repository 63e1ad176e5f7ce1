//! Error types for vision analysis

use aws_sdk_rekognition::{
    error::{DisplayErrorContext, SdkError},
    operation::{
        detect_faces::DetectFacesError, detect_labels::DetectLabelsError,
        recognize_celebrities::RecognizeCelebritiesError,
    },
};
use thiserror::Error;

/// Result type for vision analysis
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors returned by the vision service, one variant per analysis
#[derive(Error, Debug)]
pub enum VisionError {
    /// Label detection failed
    #[error("Error detecting labels: {0}")]
    DetectLabels(String),

    /// Celebrity recognition failed
    #[error("Error recognizing celebrities: {0}")]
    RecognizeCelebrities(String),

    /// Face detection failed
    #[error("Error detecting faces: {0}")]
    DetectFaces(String),
}

impl From<SdkError<DetectLabelsError>> for VisionError {
    fn from(error: SdkError<DetectLabelsError>) -> Self {
        Self::DetectLabels(DisplayErrorContext(&error).to_string())
    }
}

impl From<SdkError<RecognizeCelebritiesError>> for VisionError {
    fn from(error: SdkError<RecognizeCelebritiesError>) -> Self {
        Self::RecognizeCelebrities(DisplayErrorContext(&error).to_string())
    }
}

impl From<SdkError<DetectFacesError>> for VisionError {
    fn from(error: SdkError<DetectFacesError>) -> Self {
        Self::DetectFaces(DisplayErrorContext(&error).to_string())
    }
}
